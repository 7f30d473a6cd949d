/// Fixed-timestep clock. The host feeds it each frame's elapsed time and
/// drains whole fixed steps from the accumulator.
#[derive(Debug, Clone)]
pub struct FrameClock {
    pub fixed_dt: f32,
    pub max_frame_dt: f32,
    accumulator: f32,
    pub frame_dt: f32,
    pub total_time: f64,
    pub frame_count: u64,
    pub fixed_step_count: u64,
    pub steps_this_frame: u32,
}

impl FrameClock {
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_frame_dt: 0.25,
            accumulator: 0.0,
            frame_dt: 0.0,
            total_time: 0.0,
            frame_count: 0,
            fixed_step_count: 0,
            steps_this_frame: 0,
        }
    }

    /// Returns the (possibly capped) frame delta the update phase should use.
    pub fn begin_frame(&mut self, real_dt: f32) -> f32 {
        let mut dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
            dt = self.max_frame_dt;
        }

        self.frame_dt = dt;
        self.accumulator += dt;
        self.total_time += f64::from(dt);
        self.steps_this_frame = 0;
        self.frame_count += 1;
        dt
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            max_frame_dt: self.max_frame_dt,
            ..Self::new(self.fixed_dt)
        };
    }
}
