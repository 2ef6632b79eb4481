use std::{
    future::Future,
    task::{Context, Poll},
    thread,
    time::Duration,
};

use futures::task::noop_waker_ref;

pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Blocks the calling thread until `future` resolves. Nothing wakes the
/// future, so it is re-polled every `POLL_INTERVAL`; I/O must be driven by a
/// runtime on another thread.
pub fn poll_until_ready<Fut, T>(future: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let mut future = Box::pin(future);
    let mut context = Context::from_waker(noop_waker_ref());

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(result) => {
                return result;
            }
            Poll::Pending => {
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

pub fn poll_until_ready_error<Fut, T, E>(future: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    poll_until_ready(future)
}
