//! In-order draining of result handles into a report.

use tracing::warn;

use crate::error::TaskError;
use crate::result_handle::ResultHandle;
use crate::types::{Input, Output};

/// One input paired with what became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub input: Input,
    pub result: Result<Output, TaskError>,
}

impl ItemOutcome {
    /// `"<label>: <input> squared is <output>"`, or a failure line.
    pub fn line(&self, label: &str) -> String {
        match &self.result {
            Ok(output) => format!("{label}: {} squared is {output}", self.input),
            Err(err) => format!("{label}: {} failed: {err}", self.input),
        }
    }
}

/// Ordered outcomes of one run path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub label: String,
    pub items: Vec<ItemOutcome>,
}

impl Report {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ItemOutcome) {
        if let Err(err) = &item.result {
            warn!(label = %self.label, input = item.input, error = %err, "item failed");
        }
        self.items.push(item);
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_err()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.items.len() - self.failed()
    }

    pub fn inputs(&self) -> Vec<Input> {
        self.items.iter().map(|item| item.input).collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.items.iter().map(|item| item.line(&self.label))
    }
}

/// Drain `handles` in index order, pairing each with `inputs[i]`.
///
/// Blocks on each handle in turn, so the report follows submission order no
/// matter which task finished first. `on_item` sees every outcome as soon as
/// it is collected.
pub fn collect_with<F>(
    label: &str,
    inputs: &[Input],
    handles: Vec<ResultHandle<Output>>,
    mut on_item: F,
) -> Report
where
    F: FnMut(&ItemOutcome),
{
    assert_eq!(inputs.len(), handles.len(), "one handle per input");
    let mut report = Report::new(label);
    for (&input, handle) in inputs.iter().zip(handles) {
        let item = ItemOutcome {
            input,
            result: handle.get(),
        };
        on_item(&item);
        report.push(item);
    }
    report
}

pub fn collect(label: &str, inputs: &[Input], handles: Vec<ResultHandle<Output>>) -> Report {
    collect_with(label, inputs, handles, |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_handle::channel;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn report_follows_input_order_not_completion_order() {
        let inputs: Vec<Input> = vec![1, 2, 3, 4];
        let mut resolvers = Vec::new();
        let mut handles = Vec::new();
        for _ in &inputs {
            let (resolver, handle) = channel();
            resolvers.push(resolver);
            handles.push(handle);
        }

        // Resolve in reverse so the last input finishes first.
        let resolver_thread = thread::spawn(move || {
            for (i, mut resolver) in resolvers.into_iter().enumerate().rev() {
                let input = (i + 1) as Output;
                resolver.resolve(Ok(input * input)).expect("resolve");
                thread::sleep(Duration::from_millis(5));
            }
        });

        let mut seen = Vec::new();
        let report = collect_with("parallel", &inputs, handles, |item| seen.push(item.input));
        resolver_thread.join().expect("resolver thread panicked");

        assert_eq!(seen, inputs);
        assert_eq!(report.inputs(), inputs);
        let values: Vec<_> = report.items.iter().map(|i| i.result.clone()).collect();
        assert_eq!(values, vec![Ok(1), Ok(4), Ok(9), Ok(16)]);
    }

    #[test]
    #[should_panic(expected = "one handle per input")]
    fn mismatched_handle_count_is_rejected() {
        let (mut resolver, handle) = channel();
        resolver.resolve(Ok(1)).expect("resolve");
        let (_extra_resolver, extra) = channel();
        collect("parallel", &[1], vec![handle, extra]);
    }

    #[test]
    fn failures_stay_in_place() {
        let inputs: Vec<Input> = vec![1, 2, 3];
        let mut handles = Vec::new();
        for &input in &inputs {
            let (mut resolver, handle) = channel();
            let outcome = if input == 2 {
                Err(TaskError::Interrupted)
            } else {
                Ok(input * input)
            };
            resolver.resolve(outcome).expect("resolve");
            handles.push(handle);
        }

        let report = collect("parallel", &inputs, handles);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let lines: Vec<String> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "parallel: 1 squared is 1".to_string(),
                "parallel: 2 failed: interrupted while waiting".to_string(),
                "parallel: 3 squared is 9".to_string(),
            ]
        );
    }
}
