//! Cooperative "run on the next frame" scheduling.
//!
//! Tasks are one-shot: `take_due` hands out everything scheduled so far and
//! a task that wants to keep running schedules itself again.

/// Handle for cancelling a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

#[derive(Debug)]
pub struct FrameScheduler<T> {
    queue: Vec<(FrameToken, T)>,
    next_token: u64,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            next_token: 0,
        }
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next frame
    pub fn schedule(&mut self, task: T) -> FrameToken {
        let token = FrameToken(self.next_token);
        self.next_token += 1;
        self.queue.push((token, task));
        token
    }

    /// Drop a task before it runs; returns false if it already ran or was cancelled
    pub fn cancel(&mut self, token: FrameToken) -> bool {
        let before = self.queue.len();
        self.queue.retain(|(queued, _)| *queued != token);
        self.queue.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Move every queued task into `out`, in scheduling order
    pub fn take_due(&mut self, out: &mut Vec<T>) {
        out.extend(self.queue.drain(..).map(|(_, task)| task));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
