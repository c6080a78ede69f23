//! Pluggable branch selection for the unstable operation.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use rand::Rng;

/// Which way a single unstable call goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Success,
    Exception,
    Delay,
}

impl Branch {
    pub const ALL: [Branch; 3] = [Branch::Success, Branch::Exception, Branch::Delay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Success => "success",
            Branch::Exception => "exception",
            Branch::Delay => "delay",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown branch '{0}' (expected success, exception or delay)")]
pub struct UnknownBranch(String);

impl FromStr for Branch {
    type Err = UnknownBranch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Branch::Success),
            "exception" => Ok(Branch::Exception),
            "delay" => Ok(Branch::Delay),
            other => Err(UnknownBranch(other.to_string())),
        }
    }
}

/// Source of branch decisions.
///
/// Implementations must be safe to call from many requests at once.
pub trait OutcomeSource: Send + Sync {
    fn pick(&self) -> Branch;
}

/// Uniform choice over all three branches.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomOutcomes;

impl OutcomeSource for RandomOutcomes {
    fn pick(&self) -> Branch {
        Branch::ALL[rand::thread_rng().gen_range(0..Branch::ALL.len())]
    }
}

/// Always the same branch.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcome(pub Branch);

impl OutcomeSource for FixedOutcome {
    fn pick(&self) -> Branch {
        self.0
    }
}

/// Replays branches in order; the last one repeats once the script runs out.
#[derive(Debug)]
pub struct ScriptedOutcomes {
    queue: Mutex<VecDeque<Branch>>,
    last: Branch,
}

impl ScriptedOutcomes {
    /// An empty script behaves like `FixedOutcome(Branch::Success)`.
    pub fn new(script: impl IntoIterator<Item = Branch>) -> Self {
        let queue: VecDeque<Branch> = script.into_iter().collect();
        let last = queue.back().copied().unwrap_or(Branch::Success);
        Self {
            queue: Mutex::new(queue),
            last,
        }
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn pick(&self) -> Branch {
        let mut queue = match self.queue.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.pop_front().unwrap_or(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_random_covers_every_branch() {
        let source = RandomOutcomes;
        let mut seen: HashMap<Branch, usize> = HashMap::new();
        for _ in 0..3000 {
            *seen.entry(source.pick()).or_default() += 1;
        }
        for branch in Branch::ALL {
            let count = seen.get(&branch).copied().unwrap_or(0);
            // Expected 1000 each; generous bounds.
            assert!(count > 800 && count < 1200, "{branch}: {count}");
        }
    }

    #[test]
    fn test_scripted_replays_then_repeats_last() {
        let source = ScriptedOutcomes::new([Branch::Exception, Branch::Delay, Branch::Success]);
        assert_eq!(source.pick(), Branch::Exception);
        assert_eq!(source.pick(), Branch::Delay);
        assert_eq!(source.pick(), Branch::Success);
        assert_eq!(source.pick(), Branch::Success);
    }

    #[test]
    fn test_branch_parses_from_name() {
        assert_eq!("delay".parse::<Branch>(), Ok(Branch::Delay));
        assert!("sometimes".parse::<Branch>().is_err());
    }
}
