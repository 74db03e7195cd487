/// One selectable action of a filter, applied as `filter=<filter>:<action>`.
pub struct FilterAction<R> {
    pub action_name: &'static str,
    pub predicate: fn(&R) -> bool,
    /// Date-range style actions depend on the clock, so their result size
    /// cannot be promised up front and `filterinfo` reports `count: null`
    /// for them.
    pub counted: bool,
}

/// A named filter attached to a column, holding the actions a client can
/// pick from.
pub struct TableFilter<R> {
    pub name: &'static str,
    pub actions: Vec<FilterAction<R>>,
}
