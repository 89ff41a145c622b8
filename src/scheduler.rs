//! Deferred tasks
//!
//! The titlebar needs exactly one kind of timer: a short delay before the drag
//! region is shown again after a menu opens. Hosts plug their event loop in
//! through [`Scheduler`]; [`ManualScheduler`] drives a virtual clock and is
//! what the demo and the tests use.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

new_key_type! {
    /// Identifies a scheduled task
    pub struct TaskId;
}

/// Runs closures after a delay on the UI thread
pub trait Scheduler {
    /// Run `task` once `delay` has elapsed
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId;

    /// Drop a task that has not run yet. Unknown or finished ids are ignored.
    fn cancel(&self, id: TaskId);
}

struct ScheduledTask {
    task: Box<dyn FnOnce()>,
}

/// An entry in the run queue (min-heap by due time, then insertion order)
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TaskId,
    due: Duration,
    seq: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    tasks: SlotMap<TaskId, ScheduledTask>,
    queue: BinaryHeap<QueueEntry>,
}

/// Scheduler driven by an explicit virtual clock
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Move the clock forward, running every task that becomes due, in order
    ///
    /// Tasks may schedule or cancel other tasks while running.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let task = {
                let mut state = self.state.borrow_mut();
                match state.queue.peek() {
                    Some(entry) if entry.due <= target => {
                        let entry = *entry;
                        state.queue.pop();
                        state.now = entry.due;
                        state.tasks.remove(entry.id)
                    }
                    _ => None,
                }
            };
            match task {
                Some(scheduled) => (scheduled.task)(),
                None => {
                    let mut state = self.state.borrow_mut();
                    let more_due = state.queue.peek().is_some_and(|e| e.due <= target);
                    if !more_due {
                        state.now = target;
                        break;
                    }
                }
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        let id = state.tasks.insert(ScheduledTask { task });
        state.queue.push(QueueEntry { id, due, seq });
        id
    }

    fn cancel(&self, id: TaskId) {
        // The queue entry stays behind and is skipped when popped
        self.state.borrow_mut().tasks.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let make = move |name: &'static str| {
            let l = l.clone();
            Box::new(move || l.borrow_mut().push(name)) as Box<dyn FnOnce()>
        };
        (log, make)
    }

    #[test]
    fn tasks_run_when_due() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.schedule(Duration::from_millis(50), make("late"));
        scheduler.schedule(Duration::from_millis(10), make("early"));

        scheduler.advance(Duration::from_millis(20));
        assert_eq!(*log.borrow(), vec!["early"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(30));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(50));
    }

    #[test]
    fn same_due_time_runs_in_insertion_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.schedule(Duration::from_millis(5), make("a"));
        scheduler.schedule(Duration::from_millis(5), make("b"));
        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        let id = scheduler.schedule(Duration::from_millis(50), Box::new(move || r.set(true)));
        scheduler.cancel(id);
        scheduler.cancel(id);
        scheduler.advance(Duration::from_secs(1));
        assert!(!ran.get());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn task_can_schedule_followup() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (log, make) = recorder();
        let s = scheduler.clone();
        let follow = make("second");
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                s.schedule(Duration::from_millis(10), follow);
            }),
        );
        scheduler.advance(Duration::from_millis(15));
        assert!(log.borrow().is_empty());
        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*log.borrow(), vec!["second"]);
    }
}
