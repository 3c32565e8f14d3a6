/// A structured header value that can render itself to wire text and decide
/// whether some other wire text means the same thing.
///
/// Matching is structural: the actual text is parsed with the same grammar
/// and compared with `==`, so directive order, attribute case and redundant
/// whitespace do not cause false negatives.
pub trait HeaderValue: Sized + PartialEq {
    type Error;

    fn parse(wire: &str) -> Result<Self, Self::Error>;

    /// The fixed-order wire form. `parse(v.canonical())` must equal `v`.
    fn canonical(&self) -> String;

    /// Fails when `actual` is malformed rather than reporting `false`.
    fn matches(&self, actual: &str) -> Result<bool, Self::Error> {
        Ok(Self::parse(actual)? == *self)
    }
}
