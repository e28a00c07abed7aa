/// Stable identifier of a sorting layer.
///
/// Ids survive renames and reordering; lights target layers by id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SortingLayerId(pub u32);

/// A named sorting layer.
///
/// `value` is the sort key drawables on this layer carry. Layers are rendered in
/// list order, which is expected to match ascending `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct SortingLayer {
    pub id: SortingLayerId,
    pub name: String,
    pub value: i16,
}

impl SortingLayer {
    pub fn new(id: SortingLayerId, name: impl Into<String>, value: i16) -> Self {
        Self { id, name: name.into(), value }
    }
}

/// Supplies the ordered sorting-layer list.
///
/// The shading pass snapshots the list once at construction. While the source
/// reports it is not playing (an editing session where layers may change under
/// the renderer), the pass re-reads the list on every execute.
pub trait SortingLayerSource {
    fn sorting_layers(&self) -> Vec<SortingLayer>;

    fn is_playing(&self) -> bool {
        true
    }
}

impl SortingLayerSource for Vec<SortingLayer> {
    fn sorting_layers(&self) -> Vec<SortingLayer> {
        self.clone()
    }
}

/// In-memory sorting-layer table.
///
/// Ids are assigned sequentially on insertion and never reused.
#[derive(Debug, Clone)]
pub struct SortingLayerTable {
    layers: Vec<SortingLayer>,
    next_id: u32,
    playing: bool,
}

impl Default for SortingLayerTable {
    fn default() -> Self {
        Self { layers: Vec::new(), next_id: 0, playing: true }
    }
}

impl SortingLayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer and returns its id.
    pub fn push(&mut self, name: impl Into<String>, value: i16) -> SortingLayerId {
        let id = SortingLayerId(self.next_id);
        self.next_id += 1;

        let layer = SortingLayer::new(id, name, value);
        if let Some(prev) = self.layers.last() {
            if prev.value >= layer.value {
                log::warn!(
                    "sorting layer '{}' ({}) does not sort after '{}' ({})",
                    layer.name, layer.value, prev.name, prev.value
                );
            }
        }
        self.layers.push(layer);
        id
    }

    /// Removes a layer. Returns `false` if the id is unknown.
    pub fn remove(&mut self, id: SortingLayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        self.layers.len() != before
    }

    pub fn get(&self, id: SortingLayerId) -> Option<&SortingLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn find(&self, name: &str) -> Option<&SortingLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn layers(&self) -> &[SortingLayer] {
        &self.layers
    }

    /// Marks the table as live-edited (`false`) or frozen for play (`true`).
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }
}

impl SortingLayerSource for SortingLayerTable {
    fn sorting_layers(&self) -> Vec<SortingLayer> {
        self.layers.clone()
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
