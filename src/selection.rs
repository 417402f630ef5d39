//! The selection state machine.
//!
//! One controller holds the single authoritative focus - a global mode or a
//! specific entity - and the transition rules that update it. Everything the
//! view layer renders (camera target, list highlight, detail visibility) is
//! a projection derived from that one state, recomputed as a unit on every
//! transition so no reader observes a torn combination.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::api::HotspotClient;
use crate::hex::HexIndex;
use crate::models::{Coordinate, Entity, Hotspot, Validator, Witness};

// ============================================================================
// Constants
// ============================================================================

/// How long the opening sheet animation runs before the map should appear,
/// when not starting directly on the map.
pub const SHEET_ANIM_MS: u64 = 500;

/// Fallback map center when the account has no located hotspots and no
/// device location: San Francisco.
pub const DEFAULT_MAP_CENTER: Coordinate = Coordinate {
    lat: 37.7749,
    lng: -122.4194,
};

// ============================================================================
// State types
// ============================================================================

/// The named global modes a selection can sit in when no entity is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalOption {
    Home,
    Explore,
    Search,
    Validators,
}

/// The single current focus. Exactly one target is active at any time.
#[derive(Debug, Clone)]
pub enum SelectionTarget {
    Global(GlobalOption),
    Focused(Entity),
}

impl SelectionTarget {
    pub fn is_global(&self) -> bool {
        matches!(self, SelectionTarget::Global(_))
    }

    pub fn focused_address(&self) -> Option<&str> {
        match self {
            SelectionTarget::Global(_) => None,
            SelectionTarget::Focused(e) => Some(e.address()),
        }
    }

    /// Focus identity is address identity.
    fn same_focus(&self, entity: &Entity) -> bool {
        self.focused_address() == Some(entity.address())
    }
}

/// Which hotspots the map should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFilter {
    Owned,
    Witness,
    Reward,
}

/// Hint for the view layer that a transition should animate the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutHint {
    ShortcutChanged,
}

struct SelectionState {
    target: SelectionTarget,
    selected_hex: Option<String>,
    selected_index: usize,
    list_index: usize,
    map_filter: MapFilter,
    detail_height: f64,
    map_center: Coordinate,
    map_shown: bool,
    /// Monotonic transition counter; async resolutions that started before
    /// the latest transition are discarded when they arrive.
    seq: u64,
}

/// Read-only projection of the selection state, computed synchronously as a
/// unit immediately after each state write.
#[derive(Debug, Clone)]
pub struct SelectionSnapshot {
    pub target: SelectionTarget,
    pub focused_address: Option<String>,
    pub focused_hotspot: Option<Hotspot>,
    pub focused_witness: Option<Witness>,
    pub focused_validator: Option<Validator>,
    pub show_owned: bool,
    pub show_witnesses: bool,
    pub show_reward_scale: bool,
    /// Undefined while a global mode is active, otherwise the detail-panel
    /// height supplied by the view layer.
    pub camera_bottom_offset: Option<f64>,
    pub map_center: Coordinate,
    pub map_filter: MapFilter,
    pub selected_hex: Option<String>,
    pub hex_bucket: Vec<Hotspot>,
    pub selected_index: usize,
    pub list_index: usize,
    pub map_shown: bool,
}

// ============================================================================
// Controller
// ============================================================================

/// Owner of the current focus and its transition rules.
///
/// Transitions themselves never suspend; suspension happens only at the
/// awaited fetches inside [`HexIndex`] and the collaborator, after which
/// the result is applied (or discarded as stale) in one synchronous step.
pub struct SelectionController {
    state: Mutex<SelectionState>,
    hex: HexIndex,
    client: Arc<dyn HotspotClient>,
}

impl SelectionController {
    /// Start in `Global(Explore)` with the map shown when constructed in
    /// map mode, else `Global(Home)` with the map revealed after the
    /// opening animation.
    pub fn new(client: Arc<dyn HotspotClient>, hex_ttl: Duration, start_on_map: bool) -> Self {
        let initial = if start_on_map {
            GlobalOption::Explore
        } else {
            GlobalOption::Home
        };
        Self {
            state: Mutex::new(SelectionState {
                target: SelectionTarget::Global(initial),
                selected_hex: None,
                selected_index: 0,
                list_index: 0,
                map_filter: MapFilter::Owned,
                detail_height: 0.0,
                map_center: DEFAULT_MAP_CENTER,
                map_shown: start_on_map,
                seq: 0,
            }),
            hex: HexIndex::new(Arc::clone(&client), hex_ttl),
            client,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Map reveal
    // =========================================================================

    /// How long the view layer should wait before calling
    /// [`SelectionController::reveal_map`]; `None` when the map is already
    /// shown.
    pub fn reveal_delay(&self) -> Option<Duration> {
        let state = self.lock();
        if state.map_shown {
            None
        } else {
            Some(Duration::from_millis(SHEET_ANIM_MS))
        }
    }

    pub fn reveal_map(&self) {
        self.lock().map_shown = true;
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Focus an entity. Idempotent: focusing the entity already focused
    /// (by address) produces no transition and no layout hint.
    pub fn select_entity(&self, entity: Entity) -> Option<LayoutHint> {
        let mut state = self.lock();
        Self::apply_entity(&mut state, entity)
    }

    fn apply_entity(state: &mut SelectionState, entity: Entity) -> Option<LayoutHint> {
        if state.target.same_focus(&entity) {
            return None;
        }
        state.seq += 1;
        state.target = SelectionTarget::Focused(entity);
        Some(LayoutHint::ShortcutChanged)
    }

    /// Enter a global mode. Always transitions; hex selection clears and
    /// the list index resets to 0.
    pub fn select_global(&self, mode: GlobalOption) {
        let mut state = self.lock();
        Self::apply_global(&mut state, mode);
    }

    fn apply_global(state: &mut SelectionState, mode: GlobalOption) {
        state.seq += 1;
        state.target = SelectionTarget::Global(mode);
        state.selected_hex = None;
        state.selected_index = 0;
        state.list_index = 0;
    }

    /// Select a spatial cell: fetch its bucket, pick the preferred
    /// address's position (else 0), and focus that hotspot.
    ///
    /// A fetch failure leaves the previous selection untouched; a result
    /// arriving after a later transition is discarded.
    pub async fn select_hex(
        &self,
        hex_id: &str,
        preferred_address: Option<&str>,
    ) -> Option<LayoutHint> {
        let issued = {
            let mut state = self.lock();
            state.seq += 1;
            state.seq
        };

        match self.hex.resolve(hex_id, preferred_address).await {
            Ok((bucket, index)) => {
                let mut state = self.lock();
                if state.seq != issued {
                    debug!(hex_id, "discarding stale hex resolution");
                    return None;
                }
                state.selected_hex = Some(hex_id.to_owned());
                state.selected_index = index;
                match bucket.get(index) {
                    Some(h) => {
                        let entity = Entity::Hotspot(h.clone());
                        if state.target.same_focus(&entity) {
                            None
                        } else {
                            state.target = SelectionTarget::Focused(entity);
                            Some(LayoutHint::ShortcutChanged)
                        }
                    }
                    None => None,
                }
            }
            Err(e) => {
                debug!(hex_id, error = %e, "hex fetch failed, keeping selection");
                None
            }
        }
    }

    /// Focus a hotspot and, when it has an asserted location, select its
    /// cell so the map highlights the bucket around it.
    pub async fn present_hotspot(&self, hotspot: Hotspot) -> Option<LayoutHint> {
        let hex = hotspot.location_hex.clone();
        let address = hotspot.address.clone();
        let hint = self.select_entity(Entity::Hotspot(hotspot));

        if let Some(hex_id) = hex {
            let hex_hint = self.select_hex(&hex_id, Some(&address)).await;
            return hint.or(hex_hint);
        }
        hint
    }

    pub fn present_validator(&self, validator: Validator) -> Option<LayoutHint> {
        self.select_entity(Entity::Validator(validator))
    }

    /// Page between siblings of the currently selected hex bucket.
    pub fn select_bucket_member(&self, index: usize) -> Option<LayoutHint> {
        let bucket = {
            let state = self.lock();
            state.selected_hex.clone()
        }
        .and_then(|hex| self.hex.peek(&hex));

        let bucket = bucket?;
        let member = bucket.get(index)?.clone();

        let mut state = self.lock();
        state.selected_index = index;
        Self::apply_entity(&mut state, Entity::Hotspot(member))
    }

    /// Tab reselected while this screen is focused: back to home,
    /// unconditionally, from any state.
    pub fn on_tab_reselected(&self) {
        self.select_global(GlobalOption::Home);
    }

    /// Deep link to a hotspot address. Resolution failure, or a resolution
    /// superseded by a newer transition, changes nothing.
    pub async fn on_deep_link(&self, address: &str) -> Option<LayoutHint> {
        let issued = self.lock().seq;

        match self.client.get_by_address(address).await {
            Ok(hotspot) => {
                if self.lock().seq != issued {
                    debug!(address, "discarding stale deep link resolution");
                    return None;
                }
                self.present_hotspot(hotspot).await
            }
            Err(e) => {
                debug!(address, error = %e, "deep link resolution failed");
                None
            }
        }
    }

    /// Resolve a place query and jump the map there in explore mode.
    /// An unresolvable query, or a resolution superseded by a newer
    /// transition, changes nothing.
    pub async fn select_place(&self, query: &str) -> bool {
        let issued = self.lock().seq;

        match self.client.resolve_geocode(query).await {
            Ok(coordinate) => {
                let mut state = self.lock();
                if state.seq != issued {
                    debug!(query, "discarding stale geocode resolution");
                    return false;
                }
                Self::apply_global(&mut state, GlobalOption::Explore);
                state.map_center = coordinate;
                true
            }
            Err(e) => {
                debug!(query, error = %e, "geocode resolution failed");
                false
            }
        }
    }

    /// Dismiss the list view back to the bare map.
    pub fn dismiss_list(&self) {
        self.select_global(GlobalOption::Explore);
    }

    // =========================================================================
    // View-layer inputs
    // =========================================================================

    pub fn set_map_filter(&self, filter: MapFilter) {
        self.lock().map_filter = filter;
    }

    /// Height of the detail panel, fed back by the view layer; drives the
    /// camera bottom offset while an entity is focused.
    pub fn set_detail_height(&self, height: f64) {
        self.lock().detail_height = height;
    }

    pub fn set_list_index(&self, index: usize) {
        self.lock().list_index = index;
    }

    pub fn set_map_center(&self, center: Coordinate) {
        self.lock().map_center = center;
    }

    /// Where the map should center before the user has focused anything:
    /// the first owned hotspot with a valid location, else the first such
    /// followed hotspot, else [`DEFAULT_MAP_CENTER`].
    pub fn default_map_center(owned: &[Hotspot], followed: &[Hotspot]) -> Coordinate {
        owned
            .iter()
            .chain(followed.iter())
            .find(|h| h.has_valid_location())
            .and_then(|h| match (h.lat, h.lng) {
                (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
                _ => None,
            })
            .unwrap_or(DEFAULT_MAP_CENTER)
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// Compute every projection under one lock acquisition.
    pub fn snapshot(&self) -> SelectionSnapshot {
        let state = self.lock();

        let (focused_hotspot, focused_witness, focused_validator) = match &state.target {
            SelectionTarget::Focused(Entity::Hotspot(h)) => (Some(h.clone()), None, None),
            SelectionTarget::Focused(Entity::Witness(w)) => (None, Some(w.clone()), None),
            SelectionTarget::Focused(Entity::Validator(v)) => (None, None, Some(v.clone())),
            SelectionTarget::Global(_) => (None, None, None),
        };

        let hex_bucket = state
            .selected_hex
            .as_deref()
            .and_then(|hex| self.hex.peek(hex))
            .unwrap_or_default();

        SelectionSnapshot {
            focused_address: state.target.focused_address().map(str::to_owned),
            focused_hotspot,
            focused_witness,
            focused_validator,
            show_owned: state.map_filter == MapFilter::Owned,
            show_witnesses: state.map_filter == MapFilter::Witness,
            show_reward_scale: state.map_filter == MapFilter::Reward,
            camera_bottom_offset: if state.target.is_global() {
                None
            } else {
                Some(state.detail_height)
            },
            map_center: state.map_center,
            map_filter: state.map_filter,
            selected_hex: state.selected_hex.clone(),
            hex_bucket,
            selected_index: state.selected_index,
            list_index: state.list_index,
            map_shown: state.map_shown,
            target: state.target.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
