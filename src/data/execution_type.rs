use serde::{Deserialize, Serialize};

/// How mask applications are scheduled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionType {
    /// Inline on the calling thread.
    #[default] Sequential,
    /// Fanned out over a pool of the given number of workers.
    Threads(usize),
}

// Hardcoded strategy names. Storing the "proper" spelling and the lowercase version.
const SEQUENTIAL: [&str; 2] = ["Sequential", "sequential"];
const THREADS: [&str; 2] = ["Threads", "threads"];

impl ExecutionType {
    /// Maps a worker count to a strategy: zero or negative means sequential.
    pub fn from_threads(threads: i64) -> Self {
        if threads <= 0 {
            ExecutionType::Sequential
        } else {
            ExecutionType::Threads(threads as usize)
        }
    }

    pub fn from_str(execution: &str, threads: usize) -> Option<Self> {
        match execution.to_lowercase().as_str() {
            "sequential" => Some(ExecutionType::Sequential),
            "threads" | "parallel" if threads == 0 => Some(ExecutionType::Sequential),
            "threads" | "parallel" => Some(ExecutionType::Threads(threads)),
            _ => None,
        }
    }

    /// Number of workers, zero for sequential execution.
    pub fn threads(&self) -> usize {
        match self {
            ExecutionType::Sequential => 0,
            ExecutionType::Threads(n) => *n,
        }
    }

    /// Pool size to fan out over, `None` when work stays on the calling thread.
    ///
    /// `Threads(0)` counts as sequential.
    pub fn workers(&self) -> Option<usize> {
        match self {
            ExecutionType::Threads(n) if *n > 0 => Some(*n),
            _ => None,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.workers().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionType::Sequential => SEQUENTIAL[0],
            ExecutionType::Threads(_) => THREADS[0],
        }
    }

    pub fn as_str_lowercase(&self) -> &'static str {
        match self {
            ExecutionType::Sequential => SEQUENTIAL[1],
            ExecutionType::Threads(_) => THREADS[1],
        }
    }
}

impl From<Option<i64>> for ExecutionType {
    fn from(threads: Option<i64>) -> Self {
        threads.map_or(ExecutionType::Sequential, Self::from_threads)
    }
}
