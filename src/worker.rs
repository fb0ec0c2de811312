//! Single background worker thread draining a bounded FIFO of async
//! requests, using a mutex+condvar queue so slow requests (like a git
//! status lookup) never block a prompt render.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::PromptError;
use crate::segment::git::GitStatus;
use crate::subprocess::SubprocessOutput;

/// Bound on the number of requests that may be queued at once. Submission
/// past this returns `ResourceExhausted` rather than growing unbounded.
pub const MAX_QUEUE_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub enum RequestKind {
    GitStatus,
    /// An opaque command to run through [`crate::subprocess::run`] with the
    /// request's timeout, for callers that need a one-off background
    /// subprocess without a dedicated request type.
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct AsyncRequest {
    pub id: u64,
    pub kind: RequestKind,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum ResponseData {
    GitStatus(GitStatus),
    Custom(SubprocessOutput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    SystemCall,
}

#[derive(Debug, Clone)]
pub struct AsyncResponse {
    pub id: u64,
    pub result_code: ResultCode,
    pub data: ResponseData,
}

struct Inner {
    queue: Mutex<VecDeque<AsyncRequest>>,
    cond: Condvar,
    shutdown_requested: AtomicBool,
    next_request_id: AtomicU64,
    total_requests: AtomicU64,
    total_completed: AtomicU64,
    total_timeouts: AtomicU64,
}

/// A type that can turn a request into a response, reporting whether any
/// underlying operation (typically a subprocess) timed out.
pub trait RequestHandler: Send + 'static {
    fn handle(&self, request: &AsyncRequest) -> (ResponseData, bool);
}

impl<F> RequestHandler for F
where
    F: Fn(&AsyncRequest) -> (ResponseData, bool) + Send + 'static,
{
    fn handle(&self, request: &AsyncRequest) -> (ResponseData, bool) {
        (self)(request)
    }
}

/// A type notified when a request completes. Runs on the worker thread, so
/// implementations must be non-blocking and safe to re-enter with respect
/// to state shared with the main thread — the reference use is publishing a
/// git snapshot pointer the main thread reads on its next render.
pub trait CompletionCallback: Send + 'static {
    fn on_complete(&self, response: AsyncResponse);
}

impl<F> CompletionCallback for F
where
    F: Fn(AsyncResponse) + Send + 'static,
{
    fn on_complete(&self, response: AsyncResponse) {
        (self)(response)
    }
}

/// Init → Started ⇄ Processing → ShutdownRequested → Joined → Destroyed.
pub struct AsyncWorker {
    inner: Arc<Inner>,
    thread: Option<JoinHandle<()>>,
}

impl AsyncWorker {
    pub fn start<H, C>(handler: H, on_complete: C) -> Self
    where
        H: RequestHandler,
        C: CompletionCallback,
    {
        let inner = Arc::new(Inner {
            queue: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
            shutdown_requested: AtomicBool::new(false),
            next_request_id: AtomicU64::new(1),
            total_requests: AtomicU64::new(0),
            total_completed: AtomicU64::new(0),
            total_timeouts: AtomicU64::new(0),
        });

        let thread_inner = Arc::clone(&inner);
        let thread = thread::Builder::new()
            .name("promptweave-async-worker".into())
            .spawn(move || worker_loop(thread_inner, handler, on_complete))
            .expect("failed to spawn async worker thread");

        AsyncWorker { inner, thread: Some(thread) }
    }

    pub fn submit(&self, kind: RequestKind, cwd: PathBuf, timeout: Duration) -> Result<u64, PromptError> {
        if self.inner.shutdown_requested.load(Ordering::Acquire) {
            return Err(PromptError::InvalidState("worker is shutting down".into()));
        }

        let mut queue = self.inner.queue.lock().unwrap();
        if queue.len() >= MAX_QUEUE_SIZE {
            return Err(PromptError::ResourceExhausted("async request queue is full".into()));
        }

        let id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        queue.push_back(AsyncRequest { id, kind, cwd, timeout });
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        drop(queue);
        self.inner.cond.notify_one();
        Ok(id)
    }

    pub fn shutdown(&self) {
        let _queue = self.inner.queue.lock().unwrap();
        self.inner.shutdown_requested.store(true, Ordering::Release);
        self.inner.cond.notify_all();
    }

    /// Requests shutdown and blocks until the worker thread exits, draining
    /// any in-flight work first.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.inner.total_requests.load(Ordering::Relaxed)
    }

    pub fn total_completed(&self) -> u64 {
        self.inner.total_completed.load(Ordering::Relaxed)
    }

    pub fn total_timeouts(&self) -> u64 {
        self.inner.total_timeouts.load(Ordering::Relaxed)
    }
}

impl Drop for AsyncWorker {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop<H: RequestHandler, C: CompletionCallback>(inner: Arc<Inner>, handler: H, on_complete: C) {
    loop {
        let request = {
            let mut queue = inner.queue.lock().unwrap();
            loop {
                if let Some(request) = queue.pop_front() {
                    break Some(request);
                }
                if inner.shutdown_requested.load(Ordering::Acquire) {
                    break None;
                }
                queue = inner.cond.wait(queue).unwrap();
            }
        };

        let request = match request {
            Some(request) => request,
            None => break,
        };

        let id = request.id;
        let (data, timed_out) = handler.handle(&request);
        if timed_out {
            inner.total_timeouts.fetch_add(1, Ordering::Relaxed);
        }
        inner.total_completed.fetch_add(1, Ordering::Relaxed);

        on_complete.on_complete(AsyncResponse { id, result_code: ResultCode::Success, data });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn noop_handler(_: &AsyncRequest) -> (ResponseData, bool) {
        (ResponseData::GitStatus(GitStatus::default()), false)
    }

    #[test]
    fn completions_arrive_in_submission_order() {
        let (tx, rx) = mpsc::channel();
        let worker = AsyncWorker::start(noop_handler, move |resp: AsyncResponse| {
            tx.send(resp.id).unwrap();
        });

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(worker.submit(RequestKind::GitStatus, PathBuf::from("/tmp"), Duration::from_secs(1)).unwrap());
        }

        let received: Vec<u64> = (0..3).map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap()).collect();
        assert_eq!(ids, received);
        worker.join();
    }

    #[test]
    fn submit_past_capacity_is_resource_exhausted() {
        // Block the worker so requests pile up in the queue.
        let (block_tx, block_rx) = mpsc::channel::<()>();
        let block_rx = Arc::new(Mutex::new(block_rx));
        let handler = move |_: &AsyncRequest| -> (ResponseData, bool) {
            let _ = block_rx.lock().unwrap().recv();
            (ResponseData::GitStatus(GitStatus::default()), false)
        };
        let worker = AsyncWorker::start(handler, |_resp: AsyncResponse| {});

        // First request is immediately dequeued by the worker and blocks it.
        worker.submit(RequestKind::GitStatus, PathBuf::from("/tmp"), Duration::from_secs(5)).unwrap();
        thread::sleep(Duration::from_millis(20));

        for _ in 0..MAX_QUEUE_SIZE {
            worker.submit(RequestKind::GitStatus, PathBuf::from("/tmp"), Duration::from_secs(5)).unwrap();
        }
        let result = worker.submit(RequestKind::GitStatus, PathBuf::from("/tmp"), Duration::from_secs(5));
        assert!(matches!(result, Err(PromptError::ResourceExhausted(_))));

        for _ in 0..(MAX_QUEUE_SIZE + 1) {
            let _ = block_tx.send(());
        }
        worker.join();
    }
}
