//! Pairwise win probabilities between dice.
//!
//! Purely informational: the matrix is shown as help during dice selection
//! and never feeds into round resolution.

use super::{Die, DieSet};
use std::fmt;

/// Probability that one die rolls strictly higher than another, kept as a ratio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WinProbability {
    pub wins: u64,
    pub total: u64,
}

impl WinProbability {
    /// Value used for a die compared with itself
    pub const SELF_MATCH: WinProbability = WinProbability { wins: 1, total: 3 };

    pub fn as_f64(&self) -> f64 {
        self.wins as f64 / self.total as f64
    }
}

impl fmt::Display for WinProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.as_f64())
    }
}

/// Share of face pairs where `a` shows a strictly higher face than `b`.
///
/// Identical dice return [`WinProbability::SELF_MATCH`] instead of the
/// enumerated value.
pub fn win_probability(a: &Die, b: &Die) -> WinProbability {
    if a == b {
        return WinProbability::SELF_MATCH;
    }
    enumerate(a, b)
}

fn enumerate(a: &Die, b: &Die) -> WinProbability {
    let wins = a
        .faces()
        .iter()
        .map(|fa| b.faces().iter().filter(|fb| fa > fb).count() as u64)
        .sum();
    WinProbability {
        wins,
        total: (a.len() * b.len()) as u64,
    }
}

/// Row-vs-column win probabilities for every pair of configured dice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbabilityMatrix {
    rows: Vec<Vec<WinProbability>>,
}

impl ProbabilityMatrix {
    pub fn compute(dice: &DieSet) -> Self {
        let rows = dice
            .all()
            .iter()
            .enumerate()
            .map(|(i, a)| {
                dice.all()
                    .iter()
                    .enumerate()
                    .map(|(j, b)| {
                        // The diagonal goes by position, so two distinct dice
                        // with the same faces are still enumerated.
                        if i == j {
                            WinProbability::SELF_MATCH
                        } else {
                            enumerate(a, b)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Probability that die `i` beats die `j`
    pub fn get(&self, i: usize, j: usize) -> Option<WinProbability> {
        self.rows.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as an ASCII table, one line per entry
    pub fn render(&self) -> Vec<String> {
        let labels: Vec<String> = (0..self.rows.len()).map(|i| format!("Dice {}", i)).collect();
        let corner = "Row beats column";
        let first_width = labels
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(corner.len());
        let widths: Vec<usize> = labels.iter().map(|l| l.len().max(6)).collect();

        let rule = {
            let mut line = format!("+{}+", "-".repeat(first_width + 2));
            for w in &widths {
                line.push_str(&"-".repeat(w + 2));
                line.push('+');
            }
            line
        };

        let mut lines = vec![rule.clone()];
        let mut header = format!("| {:<first_width$} |", corner);
        for (label, w) in labels.iter().zip(&widths) {
            header.push_str(&format!(" {:<w$} |", label, w = *w));
        }
        lines.push(header);
        lines.push(rule.clone());

        for (label, row) in labels.iter().zip(&self.rows) {
            let mut line = format!("| {:<first_width$} |", label);
            for (p, w) in row.iter().zip(&widths) {
                line.push_str(&format!(" {:<w$} |", p.to_string(), w = *w));
            }
            lines.push(line);
        }
        lines.push(rule);
        lines
    }
}
