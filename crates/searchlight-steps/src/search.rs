//! Step generators for array searches.
//!
//! Every generator is total: it terminates within a bound proportional to the
//! sequence length and always ends its trace with exactly one terminal step,
//! `found` or `not-found`. Binary, jump and exponential search assume the
//! sequence is sorted ascending; this is not checked.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::step::{Step, StepKind};

/// The trace of one array search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTrace {
    pub steps: Vec<Step>,
    /// Index of the match, if any.
    pub found: Option<usize>,
}

impl SearchTrace {
    fn found(steps: Vec<Step>, index: usize) -> Self {
        Self { steps, found: Some(index) }
    }

    fn exhausted(steps: Vec<Step>) -> Self {
        Self { steps, found: None }
    }
}

/// Scan left to right until the target turns up.
pub fn linear<T: PartialOrd + Display>(data: &[T], target: &T) -> SearchTrace {
    let mut steps = Vec::with_capacity(data.len() + 1);

    for (index, value) in data.iter().enumerate() {
        steps.push(Step::new(
            StepKind::Visit { index },
            format!("Compare {value} with {target}"),
        ));
        if value == target {
            steps.push(Step::found(index));
            return SearchTrace::found(steps, index);
        }
    }

    steps.push(Step::not_found("No match found"));
    SearchTrace::exhausted(steps)
}

/// Halve the active window until the target is hit or the window is empty.
pub fn binary<T: PartialOrd + Display>(data: &[T], target: &T) -> SearchTrace {
    let mut steps = Vec::new();
    let found = bisect(data, target, 0, data.len(), &mut steps);
    finish(steps, found, "Value not found")
}

/// Jump ahead by `floor(sqrt(n))` blocks, then scan the block that can hold the target.
pub fn jump<T: PartialOrd + Display>(data: &[T], target: &T) -> SearchTrace {
    let size = data.len();
    let block = block_size(size);
    let mut steps = vec![Step::note(format!("Block size √{size} ≈ {block}"))];

    let mut start = 0;
    let mut end = block;
    while start < size && data[end.min(size) - 1] < *target {
        let last = end.min(size) - 1;
        steps.push(Step::new(
            StepKind::Block { start, end: last },
            format!("Block [{start}, {last}] is too small"),
        ));
        start = end;
        end += block;
    }

    if start >= size {
        steps.push(Step::not_found(format!("{target} is larger than every value")));
        return SearchTrace::exhausted(steps);
    }

    let last = end.min(size) - 1;
    steps.push(Step::new(
        StepKind::Block { start, end: last },
        format!("Search block [{start}, {last}] linearly"),
    ));
    for index in start..=last {
        steps.push(Step::new(
            StepKind::Visit { index },
            format!("Compare {} with {target}", data[index]),
        ));
        if data[index] == *target {
            steps.push(Step::found(index));
            return SearchTrace::found(steps, index);
        }
    }

    steps.push(Step::not_found("Value not found in block"));
    SearchTrace::exhausted(steps)
}

/// Double a bound past the target, then binary-search the last doubling.
pub fn exponential<T: PartialOrd + Display>(data: &[T], target: &T) -> SearchTrace {
    let size = data.len();
    let Some(first) = data.first() else {
        return SearchTrace::exhausted(vec![Step::not_found("Sequence is empty")]);
    };

    if first == target {
        let step = Step::found(0).with_message("Start at index 0 and hit the value immediately");
        return SearchTrace::found(vec![step], 0);
    }

    let mut steps = Vec::new();
    let mut bound = 1;
    while bound < size && data[bound] < *target {
        steps.push(Step::new(
            StepKind::Window { low: bound / 2, high: bound, mid: Some(bound) },
            format!("Double the range: check index {bound}"),
        ));
        bound *= 2;
    }

    let low = bound / 2;
    let high = bound.min(size - 1);
    steps.push(Step::new(
        StepKind::Window { low, high, mid: None },
        format!("Binary search within [{low}, {high}]"),
    ));

    let found = bisect(data, target, low, high + 1, &mut steps);
    finish(steps, found, "Value not found")
}

/// Binary search over the half-open range `[low, end)`, recording window,
/// visit and note steps. Emits the `found` step on a hit but leaves
/// `not-found` to the caller.
fn bisect<T: PartialOrd + Display>(
    data: &[T],
    target: &T,
    mut low: usize,
    mut end: usize,
    steps: &mut Vec<Step>,
) -> Option<usize> {
    while low < end {
        let high = end - 1;
        let mid = low + (high - low) / 2;
        steps.push(Step::new(
            StepKind::Window { low, high, mid: Some(mid) },
            format!("Check range [{low}, {high}], middle at {mid}"),
        ));

        let value = &data[mid];
        steps.push(Step::new(
            StepKind::Visit { index: mid },
            format!("Compare {value} with {target}"),
        ));

        if value == target {
            steps.push(Step::found(mid));
            return Some(mid);
        }
        if value < target {
            low = mid + 1;
            steps.push(Step::note(format!("{value} is smaller, continue to the right")));
        } else {
            end = mid;
            steps.push(Step::note(format!("{value} is larger, continue to the left")));
        }
    }
    None
}

fn finish(mut steps: Vec<Step>, found: Option<usize>, miss: &str) -> SearchTrace {
    match found {
        Some(index) => SearchTrace::found(steps, index),
        None => {
            steps.push(Step::not_found(miss));
            SearchTrace::exhausted(steps)
        }
    }
}

/// `floor(sqrt(n))`, at least 1.
pub fn block_size(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root.max(1)
}
