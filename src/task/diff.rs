use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

/// Line-level comparison of two task texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDiff {
    pub lines: Vec<DiffLine>,
    pub stats: DiffStats,
}

impl TaskDiff {
    /// Diffs `before` against `after` using an edit-distance table over lines.
    ///
    /// Shared leading and trailing lines are matched up front. Only two cost
    /// rows and one byte of backtrack direction per cell are kept for the rest.
    pub fn between(before: &str, after: &str) -> Self {
        let old: Vec<&str> = before.split('\n').collect();
        let new: Vec<&str> = after.split('\n').collect();

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let old_mid = &old[prefix..old.len() - suffix];
        let new_mid = &new[prefix..new.len() - suffix];

        let mut lines = Vec::with_capacity(old.len().max(new.len()));
        lines.extend(old[..prefix].iter().map(|l| line(DiffKind::Unchanged, l)));
        lines.extend(middle(old_mid, new_mid));
        lines.extend(old[old.len() - suffix..].iter().map(|l| line(DiffKind::Unchanged, l)));

        let mut stats = DiffStats::default();
        for l in &lines {
            match l.kind {
                DiffKind::Added => stats.added += 1,
                DiffKind::Removed => stats.removed += 1,
                DiffKind::Unchanged => stats.unchanged += 1,
            }
        }
        Self { lines, stats }
    }

    pub fn is_identical(&self) -> bool {
        self.stats.added == 0 && self.stats.removed == 0
    }
}

#[derive(Clone, Copy)]
enum Step {
    Match,
    Add,
    Remove,
}

fn middle(old: &[&str], new: &[&str]) -> Vec<DiffLine> {
    let (n, m) = (old.len(), new.len());
    let width = m + 1;
    let mut steps = vec![Step::Match; (n + 1) * width];
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut cur = vec![0usize; width];

    for j in 1..=m {
        steps[j] = Step::Add;
    }
    for i in 1..=n {
        cur[0] = i;
        steps[i * width] = Step::Remove;
        for j in 1..=m {
            if old[i - 1] == new[j - 1] {
                cur[j] = prev[j - 1];
                steps[i * width + j] = Step::Match;
            } else {
                cur[j] = 1 + prev[j].min(cur[j - 1]).min(prev[j - 1]);
                steps[i * width + j] = if cur[j - 1] <= prev[j] {
                    Step::Add
                } else {
                    Step::Remove
                };
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    let mut lines = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        match steps[i * width + j] {
            Step::Match => {
                lines.push(line(DiffKind::Unchanged, old[i - 1]));
                i -= 1;
                j -= 1;
            }
            Step::Add => {
                lines.push(line(DiffKind::Added, new[j - 1]));
                j -= 1;
            }
            Step::Remove => {
                lines.push(line(DiffKind::Removed, old[i - 1]));
                i -= 1;
            }
        }
    }
    lines.reverse();
    lines
}

fn line(kind: DiffKind, text: &str) -> DiffLine {
    DiffLine {
        kind,
        text: text.to_string(),
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            DiffKind::Added => '+',
            DiffKind::Removed => '-',
            DiffKind::Unchanged => ' ',
        };
        write!(f, "{} {}", marker, self.text)
    }
}

impl fmt::Display for TaskDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        write!(
            f,
            "{} added, {} removed, {} unchanged",
            self.stats.added, self.stats.removed, self.stats.unchanged
        )
    }
}
