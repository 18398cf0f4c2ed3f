/// Share of samples at or above `threshold` in absolute value, in percent.
pub fn clipping_percent(samples: &[f32], threshold: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let clipped = samples.iter().filter(|s| s.abs() >= threshold).count();
    log::debug!("Clipping: {} of {} samples at or above {}", clipped, samples.len(), threshold);
    clipped as f32 / samples.len() as f32 * 100.0
}
