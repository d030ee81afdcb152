use super::size::Size;

/// Largest rectangle with the given aspect ratio that fits entirely within `target`.
///
/// The height-constrained candidate wins whenever it fits, including the case where both
/// dimensions match exactly. Empty targets and aspect ratios that are not positive and
/// finite produce [`Size::ZERO`].
pub fn fit(aspect: f64, target: Size) -> Size {
    if !(aspect.is_finite() && aspect > 0.0) || target.is_empty() {
        return Size::ZERO;
    }

    let width = target.height * aspect;
    if width <= target.width {
        Size::new(width, target.height)
    } else {
        Size::new(target.width, target.width / aspect)
    }
}

/// Whether content rendered at `previous` has to be fitted again for `target`.
///
/// A resize that keeps one dimension equal to the rendered one while not shrinking the
/// other leaves the bounding side untouched, so the current fit is still the largest one.
pub fn should_refit(previous: Size, target: Size) -> bool {
    if previous.width == target.width && previous.height <= target.height {
        return false;
    }

    if previous.height == target.height && previous.width <= target.width {
        return false;
    }

    true
}
