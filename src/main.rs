use std::{env, num::NonZeroUsize};

use anyhow::Context;
use log::info;
use ndarray::{Array2, Axis};
use ndarray_rand::RandomExt;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Normal;

use rating_factorization::{BatchFeeder, FactorConfig, FactorModel, config::InitializerConfig};

const DEFAULT_NUM_USER: usize = 200;
const DEFAULT_NUM_ITEM: usize = 100;
const LATENT_DIM: usize = 4;
const DENSITY: f64 = 0.2;
const TEST_SPLIT: f64 = 0.2;
const BATCH_SIZE: usize = 256;
const SEED: u64 = 42;

/// Draws ratings from a hidden low-rank model, keeping each (user, item) pair with probability
/// `DENSITY`. Ratings are rounded to whole stars in [1, 5].
fn synthetic_ratings(
    num_user: usize,
    num_item: usize,
    rng: &mut StdRng,
) -> anyhow::Result<Array2<f32>> {
    let factor = Normal::new(0., 0.6)?;
    let users = Array2::<f32>::random_using((num_user, LATENT_DIM), factor, rng);
    let items = Array2::<f32>::random_using((num_item, LATENT_DIM), factor, rng);
    let scores = users.dot(&items.t());

    let mut rows = Vec::new();
    for ((user, item), &score) in scores.indexed_iter() {
        if rng.random_bool(DENSITY) {
            let rating = (3. + score).round().clamp(1., 5.);
            rows.extend([user as f32, item as f32, rating]);
        }
    }

    let len = rows.len() / 3;
    Ok(Array2::from_shape_vec((len, 3), rows)?)
}

fn split(ratings: Array2<f32>, rng: &mut StdRng) -> (Array2<f32>, Array2<f32>) {
    let (test, train): (Vec<usize>, Vec<usize>) =
        (0..ratings.nrows()).partition(|_| rng.random_bool(TEST_SPLIT));

    (ratings.select(Axis(0), &train), ratings.select(Axis(0), &test))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => FactorConfig::from_path(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => {
            let init = InitializerConfig::default();
            let mut config = FactorConfig::new(init, DEFAULT_NUM_USER, DEFAULT_NUM_ITEM);
            config.num_epoch = 30;
            config.learning_rate = 0.01;
            config.seed = Some(SEED);
            config
        }
    };

    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(SEED));
    let ratings = synthetic_ratings(config.num_user, config.num_item, &mut rng)?;
    let (train, test) = split(ratings, &mut rng);
    info!(train = train.nrows(), test = test.nrows(); "synthetic ratings generated");

    let batch_size = NonZeroUsize::new(BATCH_SIZE).context("batch size must be positive")?;
    let mut train = BatchFeeder::with_seed(train, batch_size, true, rng.random())?;
    let mut test = BatchFeeder::new(test, batch_size, false)?;

    let mut model = FactorModel::new(config)?;
    model.fit(&mut train, Some(&mut test))?;

    let log = model.log_rmse();
    if let (Some(train_rmse), Some(test_rmse)) = (
        log.train_rmse().last(),
        log.test_rmse().and_then(|rmse| rmse.last()),
    ) {
        println!("final train rmse: {train_rmse:.4}, test rmse: {test_rmse:.4}");
    }

    Ok(())
}
