//! Four-element contact combinations

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of contacts a single fit consumes
pub const CONTACTS_PER_FIT: usize = 4;

/// Binomial coefficient `n choose k`, saturating on overflow
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        // Exact at every step: result * (n - i) is divisible by (i + 1)
        result = match result.checked_mul(n - i) {
            Some(product) => product / (i + 1),
            None => return usize::MAX,
        };
    }
    result
}

/// All 4-combinations of `0..n` in lexicographic order
#[derive(Debug, Clone)]
pub struct FourCombinations {
    n: usize,
    next: Option<[usize; 4]>,
}

impl FourCombinations {
    pub fn new(n: usize) -> Self {
        let next = (n >= CONTACTS_PER_FIT).then_some([0, 1, 2, 3]);
        Self { n, next }
    }
}

impl Iterator for FourCombinations {
    type Item = [usize; 4];

    fn next(&mut self) -> Option<[usize; 4]> {
        let current = self.next?;
        let mut successor = current;
        self.next = None;
        for i in (0..CONTACTS_PER_FIT).rev() {
            if successor[i] < self.n - CONTACTS_PER_FIT + i {
                successor[i] += 1;
                for j in i + 1..CONTACTS_PER_FIT {
                    successor[j] = successor[j - 1] + 1;
                }
                self.next = Some(successor);
                break;
            }
        }
        Some(current)
    }
}

/// The combination at lexicographic `rank` among the 4-combinations of `0..n`
pub fn unrank(mut rank: usize, n: usize) -> [usize; 4] {
    let mut combination = [0; 4];
    let mut value = 0;
    for (i, slot) in combination.iter_mut().enumerate() {
        let remaining = CONTACTS_PER_FIT - i - 1;
        loop {
            let starting_here = binomial(n - value - 1, remaining);
            if rank < starting_here {
                break;
            }
            rank -= starting_here;
            value += 1;
        }
        *slot = value;
        value += 1;
    }
    combination
}

/// Combinations a seed fits, either all or a deterministic subset
#[derive(Debug, Clone)]
pub enum CombinationPlan {
    All(FourCombinations),
    Sampled(std::vec::IntoIter<[usize; 4]>),
}

impl CombinationPlan {
    /// Plan the combinations of `n` contacts
    ///
    /// With a `limit` smaller than the number of combinations, `limit` distinct
    /// ranks are drawn from a ChaCha8 generator keyed by `sampling_seed` with
    /// stream `seed_index`, then visited in lexicographic order.
    pub fn new(n: usize, limit: Option<usize>, sampling_seed: u64, seed_index: usize) -> Self {
        let total = binomial(n, CONTACTS_PER_FIT);
        match limit {
            Some(limit) if limit < total => {
                let mut rng = ChaCha8Rng::seed_from_u64(sampling_seed);
                rng.set_stream(seed_index as u64);
                let mut ranks = index::sample(&mut rng, total, limit).into_vec();
                ranks.sort_unstable();
                let combinations: Vec<[usize; 4]> = ranks.into_iter().map(|r| unrank(r, n)).collect();
                CombinationPlan::Sampled(combinations.into_iter())
            }
            _ => CombinationPlan::All(FourCombinations::new(n)),
        }
    }
}

impl Iterator for CombinationPlan {
    type Item = [usize; 4];

    fn next(&mut self) -> Option<[usize; 4]> {
        match self {
            CombinationPlan::All(all) => all.next(),
            CombinationPlan::Sampled(sampled) => sampled.next(),
        }
    }
}
