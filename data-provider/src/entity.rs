/// Capability required of any storable record type.
///
/// The provider assigns identifiers itself; callers never pick them.
/// Any id carried by an item passed to `insert` or `update` is overwritten.
pub trait Entity {
    /// The record's identifier, unique within its backing store.
    fn id(&self) -> i64;

    /// Overwrite the record's identifier.
    fn set_id(&mut self, id: i64);
}
