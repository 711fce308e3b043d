use vlist_core::ElementTemplate;

/// Maps data onto elements through an [`ElementTemplate`].
pub struct DataBinder<B> {
    template: B,
}

impl<B> DataBinder<B> {
    pub fn new(template: B) -> Self {
        Self { template }
    }

    /// Build one new element per datum, in order.
    pub fn create<T>(&self, data: &[T]) -> Vec<B::Element>
    where
        B: ElementTemplate<T>,
    {
        data.iter().map(|datum| self.template.create(datum)).collect()
    }

    /// Rebind existing elements in place, pairing them with data in order.
    /// Stops at the shorter of the two sequences and returns how many were rebound.
    pub fn rebind<T>(&self, data: &[T], elements: &mut [B::Element]) -> usize
    where
        B: ElementTemplate<T>,
    {
        let mut rebound = 0;
        for (datum, element) in data.iter().zip(elements.iter_mut()) {
            self.template.update(datum, element);
            rebound += 1;
        }
        rebound
    }
}
