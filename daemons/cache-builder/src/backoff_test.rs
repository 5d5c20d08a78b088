//! Unit tests for the Fibonacci backoff.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::backoff::FibonacciBackoff;

    #[test]
    fn test_sequence_follows_fibonacci_and_caps() {
        let mut backoff = FibonacciBackoff::new(1, 30);
        let seconds: Vec<u64> = (0..10).map(|_| backoff.next_backoff().as_secs()).collect();
        assert_eq!(seconds, vec![1, 1, 2, 3, 5, 8, 13, 21, 30, 30]);
    }

    #[test]
    fn test_reset_restarts_the_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 30);
        for _ in 0..5 {
            let _ = backoff.next_backoff();
        }
        backoff.reset();
        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
        assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
    }
}
