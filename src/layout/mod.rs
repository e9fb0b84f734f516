pub mod geometry;
pub mod grid;

pub use geometry::Rect;
pub use grid::GridLayout;

/// Answers which UI items intersect a region of the content area.
///
/// Implemented by whatever owns item geometry: the view renderer in a real
/// screen, `GridLayout` when the geometry is known up front.
pub trait ElementLocator {
    /// UI indices of the items whose frames intersect `rect`.
    fn indices_in_rect(&self, rect: Rect) -> Vec<usize>;
}

impl<T: ElementLocator + ?Sized> ElementLocator for &T {
    fn indices_in_rect(&self, rect: Rect) -> Vec<usize> {
        (**self).indices_in_rect(rect)
    }
}
