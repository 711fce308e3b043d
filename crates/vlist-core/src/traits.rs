use async_trait::async_trait;
use std::sync::Arc;

/// Asynchronous paged data source.
/// Implementations return at most one page's worth of items per call; an
/// empty page means there is nothing further down the list.
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    async fn get_page(&self, page_index: usize) -> anyhow::Result<Vec<T>>;
}

#[async_trait]
impl<T, S> PageSource<T> for Arc<S>
where
    T: Send,
    S: PageSource<T> + ?Sized,
{
    async fn get_page(&self, page_index: usize) -> anyhow::Result<Vec<T>> {
        (**self).get_page(page_index).await
    }
}

/// Per-datum visual factory.
pub trait ElementTemplate<T> {
    type Element;

    /// Build a fresh element for `datum`. The element is not attached anywhere yet.
    fn create(&self, datum: &T) -> Self::Element;

    /// Rewrite an existing element in place so it represents `datum`.
    fn update(&self, datum: &T, element: &mut Self::Element);
}

/// Elements that can be moved vertically with a transform.
pub trait Translate {
    fn translate_y(&mut self, offset: f64);
}

/// The scrollable content region elements are mounted into.
pub trait ContentRegion<E> {
    /// Attach a newly created element. Called in visible order.
    fn mount(&mut self, element: &E, slot: usize);

    /// Detach one element that is leaving the pool for good.
    fn unmount(&mut self, element: &E);

    /// Detach everything, called once on teardown.
    fn unmount_all(&mut self) {}
}

impl<E> ContentRegion<E> for () {
    fn mount(&mut self, _element: &E, _slot: usize) {}

    fn unmount(&mut self, _element: &E) {}
}
