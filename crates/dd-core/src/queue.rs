//! Append-only command queue drained once per render pass.

use crate::job::DrawJob;

/// Ordered buffer of draw jobs accumulated between render passes.
///
/// Submission order is preserved; it only matters for batching locality.
/// The queue is drained exclusively by [`crate::render::BatchedRenderer`].
#[derive(Debug, Default)]
pub struct CommandQueue {
    jobs: Vec<DrawJob>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a job.
    ///
    /// A job whose vertex count does not match its kind is a caller bug; it
    /// trips a debug assertion and is discarded by the renderer in release
    /// builds.
    pub fn enqueue(&mut self, job: DrawJob) {
        debug_assert!(
            job.is_well_formed(),
            "{} job with {} vertices",
            job.kind.name(),
            job.vertices.len()
        );
        self.jobs.push(job);
    }

    /// Appends several jobs.
    pub fn extend(&mut self, jobs: impl IntoIterator<Item = DrawJob>) {
        for job in jobs {
            self.enqueue(job);
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawJob> {
        self.jobs.iter()
    }

    /// Jobs in submission order.
    pub fn jobs(&self) -> &[DrawJob] {
        &self.jobs
    }

    /// Removes every job.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Pushes without the arity assertion, to exercise release behaviour.
    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, job: DrawJob) {
        self.jobs.push(job);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::color::Color;

    #[test]
    fn test_enqueue_preserves_order() {
        let mut queue = CommandQueue::new();
        queue.enqueue(DrawJob::line(Vec3::ZERO, Vec3::X, Color::RED));
        queue.enqueue(DrawJob::point(Vec3::Y, 0.1, Color::GREEN));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.jobs()[0].color, Color::RED);
        assert_eq!(queue.jobs()[1].color, Color::GREEN);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_malformed_job_asserts_in_debug() {
        let mut queue = CommandQueue::new();
        let mut job = DrawJob::triangle(Vec3::ZERO, Vec3::X, Vec3::Y, Color::WHITE);
        job.vertices.pop();
        queue.enqueue(job);
    }
}
