use crate::error::VirtualListError;

pub type ListResult<T> = Result<T, VirtualListError>;
