//! Work postponed until after the current event turn

use std::collections::VecDeque;

use tooltip_shared::DataPointRef;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredTask {
    /// Ask the host to highlight a freshly pinned point
    Highlight(DataPointRef),
}

/// FIFO of tasks the host runs once the event that queued them has finished
#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: VecDeque<DeferredTask>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Take every queued task, oldest first
    pub fn drain(&mut self) -> Vec<DeferredTask> {
        self.tasks.drain(..).collect()
    }

    /// Drop queued highlights for a point
    pub fn cancel_highlight(&mut self, point: &DataPointRef) {
        self.tasks
            .retain(|task| !matches!(task, DeferredTask::Highlight(queued) if queued == point));
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let a = DataPointRef::new(0, 0, [1.0, 1.0]);
        let b = DataPointRef::new(0, 1, [2.0, 2.0]);
        let mut queue = DeferredQueue::new();
        queue.push(DeferredTask::Highlight(a));
        queue.push(DeferredTask::Highlight(b));

        assert_eq!(
            queue.drain(),
            vec![DeferredTask::Highlight(a), DeferredTask::Highlight(b)]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_highlight() {
        let a = DataPointRef::new(0, 0, [1.0, 1.0]);
        let b = DataPointRef::new(0, 1, [2.0, 2.0]);
        let mut queue = DeferredQueue::new();
        queue.push(DeferredTask::Highlight(a));
        queue.push(DeferredTask::Highlight(b));

        queue.cancel_highlight(&a);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain(), vec![DeferredTask::Highlight(b)]);
    }
}
