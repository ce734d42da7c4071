use crate::utils::time_utils::current_timestamp;

/**
 * Just count the amount of times sensible endpoints are
 * being called per unit of time, supposed to block them
 * entirely for a specific "block time" when that happens.
 * It's global and not per client, the point is to stop a
 * spam wave on the public forms, not to be fair.
 */
pub struct BasicRateLimiter {
  counter: u32,
  last_update: i64,
  is_limited: bool,
  max_requests: u32,
  max_requests_time: u32,
  block_duration: u32
}

impl BasicRateLimiter {

  pub fn new(
    max_requests: u32,
    max_requests_time: u32,
    block_duration: u32
  ) -> Self {
    Self {
      counter: 0,
      last_update: current_timestamp(),
      is_limited: false,
      max_requests,
      max_requests_time,
      block_duration
    }
  }

  pub fn is_locked(&self) -> bool {
    self.is_limited
  }

  pub fn is_expired(&self) -> bool {
    self.is_expired_at(current_timestamp())
  }

  // If currently locked, check if past block_duration.
  // Check if past max_request_time otherwise.
  fn is_expired_at(&self, now: i64) -> bool {
    if self.is_locked() {
      now - self.last_update >= self.block_duration.into()
    } else {
      now - self.last_update >= self.max_requests_time.into()
    }
  }

  // Counts one request, returns true if we're now
  // rate limited.
  pub fn update(&mut self) -> bool {
    self.update_at(current_timestamp())
  }

  fn update_at(&mut self, now: i64) -> bool {
    if self.is_expired_at(now) {
      // Reset:
      self.counter = 0;
      self.last_update = now;
      self.is_limited = false;
    } else {
      self.counter += 1;
      // Are we above the rate limit?
      if self.counter >= self.max_requests {
        self.is_limited = true;
        // Reset last_update:
        self.last_update = now;
      }
    }
    self.is_limited
  }

}
