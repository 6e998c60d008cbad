use std::{future::Future, io};

use tokio::runtime::{Builder, Runtime};

const IO_THREADS: usize = 2;

/// Runtime that drives SDK futures for the blocking client facade.
pub fn build_runtime() -> io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(IO_THREADS)
        .thread_name("objectfs-io")
        .enable_all()
        .build()
}

/// Blocks the calling thread until `future` resolves. Panics when called from
/// inside an async context.
pub fn block_until_ready<Fut, T>(runtime: &Runtime, future: Fut) -> T
where
    Fut: Future<Output = T>,
{
    runtime.block_on(future)
}
