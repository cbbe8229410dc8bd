use std::collections::BTreeMap;

use crate::{
    error::{TrailError, TrailResult},
    geom::Rect,
};

/// Handle to one stage element. Only `Stage` mints these, so an id is always
/// a valid index into the stage it came from.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub usize);

/// Animatable scalar style channels.
///
/// Lengths (`X`, `Y`) are CSS pixels relative to the element's layout
/// position. `Progress` is a generic 0..1 channel used by clip-style reveals.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Channel {
    X,
    Y,
    Opacity,
    Scale,
    ScaleY,
    Progress,
}

impl Channel {
    pub fn default_value(self) -> f64 {
        match self {
            Self::Scale | Self::ScaleY => 1.0,
            Self::X | Self::Y | Self::Opacity | Self::Progress => 0.0,
        }
    }
}

/// A headless stand-in for one document element: a layout rect plus the
/// mutable style state the tween engine drives.
#[derive(Clone, Debug)]
pub struct Element {
    pub name: String,
    pub rect: Rect,
    pub z_index: i32,
    pub pinned: bool,
    pub text: Option<String>,
    /// Only meaningful for image elements; the preload gate waits on it.
    pub loaded: bool,
    style: BTreeMap<Channel, f64>,
}

impl Element {
    fn new(name: String, rect: Rect, loaded: bool) -> Self {
        Self {
            name,
            rect,
            z_index: 0,
            pinned: false,
            text: None,
            loaded,
            style: BTreeMap::new(),
        }
    }

    /// Current channel value, falling back to the channel default when the
    /// element was never styled on that channel.
    pub fn channel(&self, channel: Channel) -> f64 {
        self.style
            .get(&channel)
            .copied()
            .unwrap_or_else(|| channel.default_value())
    }

    pub fn set_channel(&mut self, channel: Channel, value: f64) {
        self.style.insert(channel, value);
    }
}

/// Ordered element store, looked up by name the way the host page would use
/// selectors. Missing names surface as `Stage` errors, so an effect wired to
/// an absent element fails its initialization instead of running on nothing.
#[derive(Clone, Debug, Default)]
pub struct Stage {
    elements: Vec<Element>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rect: Rect) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element::new(name.into(), rect, true));
        id
    }

    /// Insert an image element; it stays `loaded == false` until the host
    /// reports the load, which is what the preloader waits on.
    pub fn insert_image(&mut self, name: impl Into<String>, rect: Rect) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element::new(name.into(), rect, false));
        id
    }

    pub fn select(&self, name: &str) -> TrailResult<ElementId> {
        self.elements
            .iter()
            .position(|e| e.name == name)
            .map(ElementId)
            .ok_or_else(|| TrailError::stage(format!("no element named '{name}'")))
    }

    /// All elements whose name starts with `prefix`, in insertion order.
    pub fn select_all(&self, prefix: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name.starts_with(prefix))
            .map(|(i, _)| ElementId(i))
            .collect()
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    fn rect(w: f64, h: f64) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, (w, h))
    }

    #[test]
    fn select_finds_by_name_and_errors_on_missing() {
        let mut stage = Stage::new();
        let id = stage.insert("page1", rect(100.0, 50.0));
        assert_eq!(stage.select("page1").unwrap(), id);

        let err = stage.select("page9").unwrap_err();
        assert!(err.to_string().contains("no element named 'page9'"));
    }

    #[test]
    fn select_all_preserves_insertion_order() {
        let mut stage = Stage::new();
        let a = stage.insert_image("content-img-0", rect(10.0, 10.0));
        stage.insert("counter", rect(10.0, 10.0));
        let b = stage.insert_image("content-img-1", rect(10.0, 10.0));
        assert_eq!(stage.select_all("content-img"), vec![a, b]);
    }

    #[test]
    fn unset_channels_fall_back_to_defaults() {
        let mut stage = Stage::new();
        let id = stage.insert("slide-0", rect(10.0, 10.0));
        assert_eq!(stage.element(id).channel(Channel::Opacity), 0.0);
        assert_eq!(stage.element(id).channel(Channel::Scale), 1.0);

        stage.element_mut(id).set_channel(Channel::Opacity, 0.5);
        assert_eq!(stage.element(id).channel(Channel::Opacity), 0.5);
    }

    #[test]
    fn images_start_unloaded() {
        let mut stage = Stage::new();
        let img = stage.insert_image("content-img-0", rect(10.0, 10.0));
        let div = stage.insert("footer", rect(10.0, 10.0));
        assert!(!stage.element(img).loaded);
        assert!(stage.element(div).loaded);
    }
}
