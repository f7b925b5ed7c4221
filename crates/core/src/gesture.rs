//! Pointer-gesture state machine
//!
//! Dragging and resizing are explicit modes with begin/update/finish
//! transitions, decoupled from any rendering surface so the same logic is
//! testable headlessly. Updates write position/size and reference frame
//! through the annotation store in one operation and clamp the field to
//! the current page bounds.

use crate::annotation::{AnnotationId, AnnotationSet};
use crate::geometry::{PreviewPoint, PreviewSize, ReferenceFrame};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActiveGesture {
    /// Pointer grabbed the field body; `grab_offset` is the pointer
    /// position relative to the field origin at grab time.
    Drag { id: AnnotationId, grab_offset: PreviewPoint },
    /// Pointer grabbed the bottom-right resize handle.
    Resize { id: AnnotationId },
}

impl ActiveGesture {
    fn id(&self) -> AnnotationId {
        match *self {
            Self::Drag { id, .. } | Self::Resize { id } => id,
        }
    }
}

/// Tracks at most one in-flight drag or resize.
#[derive(Debug, Default)]
pub struct GestureController {
    active: Option<ActiveGesture>,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The annotation currently being manipulated, if any.
    pub fn active_annotation(&self) -> Option<AnnotationId> {
        self.active.as_ref().map(ActiveGesture::id)
    }

    /// Start dragging `id` from `pointer`. No-op while another gesture is
    /// in flight or when the id is absent.
    pub fn begin_drag(
        &mut self,
        annotations: &AnnotationSet,
        id: AnnotationId,
        pointer: PreviewPoint,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }

        let Some(annotation) = annotations.get(id) else {
            return false;
        };

        let origin = annotation.position();
        let grab_offset = PreviewPoint::new(pointer.x - origin.x, pointer.y - origin.y);
        self.active = Some(ActiveGesture::Drag { id, grab_offset });
        true
    }

    /// Start resizing `id` from its bottom-right handle.
    pub fn begin_resize(&mut self, annotations: &AnnotationSet, id: AnnotationId) -> bool {
        if self.active.is_some() || annotations.get(id).is_none() {
            return false;
        }

        self.active = Some(ActiveGesture::Resize { id });
        true
    }

    /// Apply a pointer movement. `frame` is the preview page size at the
    /// time of the event; it is written to the annotation together with
    /// the new position/size.
    pub fn update(
        &mut self,
        annotations: &mut AnnotationSet,
        pointer: PreviewPoint,
        frame: ReferenceFrame,
    ) -> bool {
        match self.active {
            Some(ActiveGesture::Drag { id, grab_offset }) => {
                let Some(annotation) = annotations.get(id) else {
                    self.active = None;
                    return false;
                };

                let size = annotation.size();
                let position = PreviewPoint::new(
                    (pointer.x - grab_offset.x).clamp(0.0, (frame.width() - size.width).max(0.0)),
                    (pointer.y - grab_offset.y).clamp(0.0, (frame.height() - size.height).max(0.0)),
                );
                annotations.move_to(id, position, frame)
            }
            Some(ActiveGesture::Resize { id }) => {
                let Some(annotation) = annotations.get(id) else {
                    self.active = None;
                    return false;
                };

                let origin = annotation.position();
                let size = PreviewSize::new(
                    (pointer.x - origin.x).min(frame.width() - origin.x),
                    (pointer.y - origin.y).min(frame.height() - origin.y),
                );
                // The store floors to the kind minimum.
                annotations.resize(id, size, frame)
            }
            None => false,
        }
    }

    /// End the gesture, returning the id that was manipulated.
    pub fn finish(&mut self) -> Option<AnnotationId> {
        self.active.take().map(|gesture| gesture.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationKind};

    fn set_with_date_field() -> (AnnotationSet, AnnotationId) {
        let mut set = AnnotationSet::new();
        let annotation = Annotation::new(
            AnnotationKind::Date,
            1,
            PreviewPoint::new(100.0, 100.0),
            ReferenceFrame::new(600.0, 800.0),
        );
        let id = annotation.id();
        set.add(annotation);
        (set, id)
    }

    #[test]
    fn drag_moves_relative_to_grab_point() {
        let (mut set, id) = set_with_date_field();
        let mut gestures = GestureController::new();
        let frame = ReferenceFrame::new(600.0, 800.0);

        // Grab 10px into the field.
        assert!(gestures.begin_drag(&set, id, PreviewPoint::new(110.0, 110.0)));
        assert!(gestures.update(&mut set, PreviewPoint::new(210.0, 160.0), frame));

        let moved = set.get(id).unwrap();
        assert_eq!(moved.position().x, 200.0);
        assert_eq!(moved.position().y, 150.0);
        assert_eq!(gestures.finish(), Some(id));
        assert!(!gestures.is_active());
    }

    #[test]
    fn drag_clamps_to_page_bounds() {
        let (mut set, id) = set_with_date_field();
        let mut gestures = GestureController::new();
        let frame = ReferenceFrame::new(600.0, 800.0);

        gestures.begin_drag(&set, id, PreviewPoint::new(100.0, 100.0));
        gestures.update(&mut set, PreviewPoint::new(10_000.0, -500.0), frame);

        let moved = set.get(id).unwrap();
        let size = moved.size();
        assert_eq!(moved.position().x, 600.0 - size.width);
        assert_eq!(moved.position().y, 0.0);
    }

    #[test]
    fn drag_during_preview_resize_records_new_frame() {
        let (mut set, id) = set_with_date_field();
        let mut gestures = GestureController::new();

        gestures.begin_drag(&set, id, PreviewPoint::new(100.0, 100.0));

        // Preview re-rendered at 900px wide mid-gesture; the event frame
        // wins and is stored with the new position.
        let wider = ReferenceFrame::new(900.0, 1200.0);
        gestures.update(&mut set, PreviewPoint::new(450.0, 300.0), wider);

        let moved = set.get(id).unwrap();
        assert_eq!(moved.frame().width(), 900.0);
        assert_eq!(moved.position().x, 450.0);
    }

    #[test]
    fn resize_grows_from_origin_and_respects_minimum() {
        let (mut set, id) = set_with_date_field();
        let mut gestures = GestureController::new();
        let frame = ReferenceFrame::new(600.0, 800.0);

        assert!(gestures.begin_resize(&set, id));

        gestures.update(&mut set, PreviewPoint::new(300.0, 180.0), frame);
        let resized = set.get(id).unwrap();
        assert_eq!(resized.size().width, 200.0);
        assert_eq!(resized.size().height, 80.0);

        // Collapsing past the origin floors to the kind minimum.
        gestures.update(&mut set, PreviewPoint::new(101.0, 101.0), frame);
        let resized = set.get(id).unwrap();
        assert_eq!(resized.size(), AnnotationKind::Date.min_size());
    }

    #[test]
    fn only_one_gesture_at_a_time() {
        let (mut set, id) = set_with_date_field();
        let other = Annotation::new(
            AnnotationKind::Text,
            1,
            PreviewPoint::new(10.0, 10.0),
            ReferenceFrame::new(600.0, 800.0),
        );
        let other_id = other.id();
        set.add(other);

        let mut gestures = GestureController::new();
        assert!(gestures.begin_drag(&set, id, PreviewPoint::new(100.0, 100.0)));
        assert!(!gestures.begin_drag(&set, other_id, PreviewPoint::new(10.0, 10.0)));
        assert!(!gestures.begin_resize(&set, other_id));
        assert_eq!(gestures.active_annotation(), Some(id));
    }

    #[test]
    fn update_without_gesture_is_noop() {
        let (mut set, id) = set_with_date_field();
        let mut gestures = GestureController::new();

        assert!(!gestures.update(
            &mut set,
            PreviewPoint::new(0.0, 0.0),
            ReferenceFrame::new(600.0, 800.0)
        ));
        assert_eq!(set.get(id).unwrap().position().x, 100.0);
        assert_eq!(gestures.finish(), None);
    }

    #[test]
    fn gesture_on_removed_annotation_clears_itself() {
        let (mut set, id) = set_with_date_field();
        let mut gestures = GestureController::new();
        gestures.begin_drag(&set, id, PreviewPoint::new(100.0, 100.0));

        set.remove(id);
        assert!(!gestures.update(
            &mut set,
            PreviewPoint::new(50.0, 50.0),
            ReferenceFrame::new(600.0, 800.0)
        ));
        assert!(!gestures.is_active());
    }
}
