use anyhow::{Context, Result};
use std::marker::PhantomData;

/// Defines the core `Transform` trait for composable preprocessing pipelines.
///
/// A `Transform<I, O>` is a stateless step converting an input of type `I`
/// into an output of type `O`. Steps are chained with `.then(...)` into a
/// single statically-dispatched pipeline, or boxed with [`Transform::boxed`]
/// when the pipeline shape is only known at runtime (e.g. augmentation on/off).
///
/// Note: `then()` works only when:
/// 1. **Types align**: `self: Transform<I, O>`, `next: Transform<O, M>`
/// 2. **Owned**: `Self::Sized` (no trait objects, must be concrete)
/// 3. **Thread-safe**: intermediate and output types must be `Send`
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input
    fn apply(&self, input: I) -> Result<O>;

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }

    /// Erases the concrete pipeline type.
    fn boxed(self) -> BoxedTransform<I, O>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// A heap-allocated pipeline with its concrete type erased.
pub type BoxedTransform<I, O> = Box<dyn Transform<I, O>>;

impl<I, O> Transform<I, O> for BoxedTransform<I, O> {
    fn apply(&self, input: I) -> Result<O> {
        (**self).apply(input)
    }
}

/// A chain of two transforms (`A` -> `B`)
/// - `PhantomData<M>` enforces intermediate type alignment.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Creates a new transform chain.
    /// Use [`Transform::then`] for better ergonomics.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        self.first
            .apply(input)
            .and_then(|mid| self.second.apply(mid))
            .with_context(|| {
                format!(
                    "Transform chain failed: {} → {} → {}",
                    std::any::type_name::<A>(),
                    std::any::type_name::<B>(),
                    std::any::type_name::<O>()
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;

    struct FileName;
    impl Transform<PathBuf, String> for FileName {
        fn apply(&self, input: PathBuf) -> Result<String> {
            input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow!("no file name in {}", input.display()))
        }
    }

    struct CountBytes;
    impl Transform<String, usize> for CountBytes {
        fn apply(&self, input: String) -> Result<usize> {
            Ok(input.len())
        }
    }

    #[test]
    fn test_pipeline_construction_using_then() -> Result<()> {
        let pipeline = FileName.then(CountBytes);
        assert_eq!(pipeline.apply(PathBuf::from("images/0001.jpg"))?, 8);
        Ok(())
    }

    #[test]
    fn test_boxed_pipeline_behaves_like_concrete() -> Result<()> {
        let boxed: BoxedTransform<PathBuf, usize> = FileName.then(CountBytes).boxed();
        assert_eq!(boxed.apply(PathBuf::from("gt/a.png"))?, 5);
        Ok(())
    }

    #[test]
    fn test_pipeline_chain_error_context() {
        let chain = Chain::new(FileName, CountBytes);
        let err = chain.apply(PathBuf::from("/")).unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("Transform chain failed"));
        assert!(msg.contains("FileName"));
        assert!(msg.contains("CountBytes"));
    }
}
