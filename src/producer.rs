use std::thread;

use crate::{BoundedBuffer, Error, PushError, Result, Wait};

/// Pushes every item into `buffer`, then finishes it
///
/// Items are pushed in order. A full buffer is waited on ([`Wait::Block`]) or
/// retried after yielding ([`Wait::Spin`]). The buffer is finished exactly once,
/// after the last item has been accepted.
///
/// Returns the number of items pushed.
///
/// # Errors
///
/// Returns [`Error::BufferAbandoned`] if every registered consumer is gone
/// before all items were accepted. The buffer is left unfinished.
pub fn fill<T, I>(buffer: &BoundedBuffer<T>, items: I, wait: Wait) -> Result<usize>
where
    I: IntoIterator<Item = T>,
{
    let mut pushed = 0;
    for item in items {
        match wait {
            Wait::Block => buffer
                .push(item)
                .map_err(|_| Error::BufferAbandoned)?,
            Wait::Spin => {
                let mut pending = item;
                loop {
                    match buffer.try_push(pending) {
                        Ok(()) => break,
                        Err(PushError::Full(rejected)) => {
                            pending = rejected;
                            thread::yield_now();
                        }
                        Err(PushError::Abandoned(_)) => return Err(Error::BufferAbandoned),
                    }
                }
            }
        }
        pushed += 1;
    }
    buffer.finish();
    Ok(pushed)
}
