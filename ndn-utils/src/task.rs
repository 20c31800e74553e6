//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//
// Task spawning helper shared by `ndn-face` and `ndn-fw`.
//

use std::future::Future;
use std::pin::Pin;

use tokio::task;

/// A handle to a task spawned with [`Task::spawn`].
///
/// Dropping this handle cancels the task. This gives the Face rx/tx loops
/// and the Forwarder's main loop ordinary RAII teardown: closing the owning
/// value aborts the tasks it spawned instead of requiring a bespoke
/// shutdown message.
#[derive(Debug)]
pub struct Task<T> {
    join_handle: task::JoinHandle<T>,
}

impl<T> Task<T> {
    /// Spawns a new asynchronous task, returning a handle for it.
    pub fn spawn<Fut>(future: Fut) -> Task<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn(future),
        }
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T, task::JoinError>;

    fn poll(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        Pin::new(&mut self.join_handle).poll(cx)
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.join_handle.abort();
    }
}
