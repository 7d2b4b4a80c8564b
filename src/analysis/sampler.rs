use crate::PostRecord;

pub const DEFAULT_SAMPLE_COUNT: usize = 5;

// Selects posts for deep analysis from a population sorted by view_count
// descending. Coverage: top 2 + the two posts straddling the midpoint +
// the last-ranked post. The five-slot selection is always computed first
// and then truncated to target_count. At n == 5 the midpoint pair collides
// with rank 2; the colliding slot is dropped so the selection never
// contains duplicates.
pub fn sample_posts(population: &[PostRecord], target_count: usize) -> Vec<PostRecord> {
    let n = population.len();
    if n == 0 {
        return Vec::new();
    }
    if n <= 2 {
        return population.to_vec();
    }
    if n <= 4 {
        return vec![
            population[0].clone(),
            population[1].clone(),
            population[n - 1].clone(),
        ];
    }

    let mid = n / 2;
    let mut indices = vec![0, 1, mid - 1, mid, n - 1];
    indices.dedup();
    indices.truncate(target_count);
    indices
        .into_iter()
        .map(|index| population[index].clone())
        .collect()
}
