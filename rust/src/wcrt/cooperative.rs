//! WCRT of a purely cooperative (run-to-completion) dispatcher.

/// WCRT of each task from its execution cost, tasks in priority order.
///
/// A task waits for itself and every higher-priority task, plus the single
/// longest lower-priority task, which may have been dispatched just before
/// the release and cannot be preempted. One time tick is subtracted from that
/// blocking term because releases are only detected on tick boundaries.
/// The corrected blocking term never drops below zero, so a tick longer than
/// every lower-priority cost cannot push a WCRT under the task's own cost.
///
/// `costs` is the raw WCET in the cooperative-only case and the
/// preemption-inflated R' when composing the mixed case.
pub fn cooperative_wcrt(costs: &[f64], time_tick: f64) -> Vec<f64> {
    let n = costs.len();

    // longest_below[i] = max(costs[i+1..]), absent for the lowest priority task
    let mut longest_below: Vec<Option<f64>> = vec![None; n];
    let mut running_max: Option<f64> = None;
    for idx in (0..n).rev() {
        longest_below[idx] = running_max;
        running_max = Some(running_max.map_or(costs[idx], |m| m.max(costs[idx])));
    }

    let mut wcrt = Vec::with_capacity(n);
    let mut higher_and_own = 0.0;
    for (idx, cost) in costs.iter().enumerate() {
        higher_and_own += cost;
        let blocking = match longest_below[idx] {
            Some(longest) => (longest - time_tick).max(0.0),
            None => 0.0,
        };
        wcrt.push(higher_and_own + blocking);
    }
    wcrt
}
