use std::ops::Range;
use std::panic;
use std::thread;

pub trait Split: Sized {
    fn split_to_vec(self, n: usize) -> Vec<Self>;
}

pub trait Join: Sized {
    fn join_vec(parts: Vec<Self>) -> Self;
}

impl Split for Range<u32> {
    fn split_to_vec(self, n: usize) -> Vec<Self> {
        let n = n.max(1) as u32;
        let len = self.end.saturating_sub(self.start);
        let size = len / n;
        let size_xtra = len % n;

        let mut start = self.start;
        let mut parts = Vec::with_capacity(n as usize);
        for i in 0..n {
            let end = start + size + u32::from(i < size_xtra);
            parts.push(start..end);
            start = end;
        }
        parts
    }
}

impl<T> Join for Vec<T> {
    fn join_vec(parts: Vec<Self>) -> Self {
        let len = parts.iter().map(Vec::len).sum();
        let mut joined = Vec::with_capacity(len);
        for part in parts {
            joined.extend(part);
        }
        joined
    }
}

/// Splits `input` into `threads` parts, runs `f` on each part in its own
/// scoped thread and joins the results in input order.
pub fn scatter<I, O, F>(input: I, threads: usize, f: F) -> O
where
    I: Split + Send,
    O: Join + Send,
    F: Fn(I) -> O + Sync,
{
    if threads <= 1 {
        return f(input);
    }
    let f = &f;
    let outputs: Vec<O> = thread::scope(|s| {
        let handles: Vec<_> = input
            .split_to_vec(threads)
            .into_iter()
            .map(|part| s.spawn(move || f(part)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(output) => output,
                Err(cause) => panic::resume_unwind(cause),
            })
            .collect()
    });
    O::join_vec(outputs)
}
