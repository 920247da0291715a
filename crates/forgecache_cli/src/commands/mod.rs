pub(crate) mod limits;
pub(crate) mod migrate;
pub(crate) mod search;
pub(crate) mod show;
pub(crate) mod warm;
