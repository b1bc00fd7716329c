use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

/// Helper trait for sampling random field elements.
pub trait RandomField: Sized {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl<F> RandomField for F
where
    StandardUniform: Distribution<F>,
{
    #[inline]
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardUniform.sample(rng)
    }
}
