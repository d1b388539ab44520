//! Round-robin assignment of tasks to workers.

/// The worker for the task at `index`, or `None` when there are no workers.
pub fn assignee_for(index: usize, workers: &[String]) -> Option<&str> {
    if workers.is_empty() {
        return None;
    }
    Some(workers[index % workers.len()].as_str())
}

/// Assignees for `count` tasks, in task order.
pub fn round_robin(count: usize, workers: &[String]) -> Vec<Option<&str>> {
    (0..count).map(|index| assignee_for(index, workers)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_two_workers_three_tasks() {
        let w = workers(&["w0@x", "w1@x"]);
        assert_eq!(round_robin(3, &w), vec![Some("w0@x"), Some("w1@x"), Some("w0@x")]);
    }

    #[test]
    fn test_no_workers_leaves_tasks_unassigned() {
        assert_eq!(round_robin(3, &[]), vec![None, None, None]);
    }

    #[test]
    fn test_index_modulo_worker_count() {
        let w = workers(&["a", "b", "c"]);
        for count in 0..10 {
            let assigned = round_robin(count, &w);
            assert_eq!(assigned.len(), count);
            for (i, who) in assigned.iter().enumerate() {
                assert_eq!(*who, Some(w[i % 3].as_str()));
            }
        }
    }

    #[test]
    fn test_more_workers_than_tasks() {
        let w = workers(&["a", "b", "c"]);
        assert_eq!(round_robin(1, &w), vec![Some("a")]);
    }
}
