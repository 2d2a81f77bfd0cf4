//! Centralized identifiers and limits for the Mahogany Homes helper.
//!
//! Item ids, widget coordinates and chat strings mirror what the game client
//! reports. Keeping them together means a client update only touches this file.

// Sack --------------------------------------------------------------------
/// Maximum number of planks the sack can hold.
pub const SACK_CAPACITY: u8 = 28;
/// Persisted encoding for an unknown sack count.
pub const UNKNOWN_ESTIMATE: i32 = -1;

// Item ids ----------------------------------------------------------------
pub const ITEM_PLANK: u32 = 960;
pub const ITEM_OAK_PLANK: u32 = 8778;
pub const ITEM_TEAK_PLANK: u32 = 8780;
pub const ITEM_MAHOGANY_PLANK: u32 = 8782;
pub const ITEM_STEEL_BAR: u32 = 2353;
pub const ITEM_PLANK_SACK: u32 = 24882;

/// Container id of the player's main inventory.
pub const INVENTORY_CONTAINER_ID: i32 = 93;

// Menu actions ------------------------------------------------------------
pub(crate) const SACK_MENU_TARGET: &str = "<col=ff9040>Plank sack</col>";
pub(crate) const OPTION_FILL: &str = "Fill";
pub(crate) const OPTION_EMPTY: &str = "Empty";
pub(crate) const OPTION_USE: &str = "Use";
pub(crate) const OPTION_FILL_FROM_INVENTORY: &str = "Fill from inventory";
pub(crate) const OPTION_EMPTY_TO_INVENTORY: &str = "Empty to inventory";
pub(crate) const OPTION_REPAIR: &str = "Repair";
pub(crate) const OPTION_BUILD: &str = "Build";
/// Widget param used by the inventory panel for item operations.
pub(crate) const INVENTORY_WIDGET_PARAM: i32 = 9;

// Chat --------------------------------------------------------------------
pub(crate) const SACK_REPORT_PREFIX: &str = "Basic&#160;planks:";
pub(crate) const SACK_REPORT_SEPARATOR: &str = ":&#160;";
pub(crate) const MSG_SACK_FULL: &str = "Your sack is full.";
pub(crate) const MSG_SACK_EMPTY: &str = "Your sack is empty.";
pub(crate) const MSG_SACK_NOTHING_TO_FILL: &str =
    "You haven't got any planks that can go in the sack.";

// Build menu --------------------------------------------------------------
pub(crate) const MATERIAL_LINE_BREAK: &str = "<br>";
pub(crate) const MATERIAL_SEPARATOR: &str = ": ";

// Persistence keys --------------------------------------------------------
/// Configuration group holding [`crate::HelperConfig`].
pub const CONFIG_GROUP: &str = "mahoganyhomeshelper";
/// Profile group for the sack estimate, kept apart from the helper settings.
pub const SACK_CONFIG_GROUP: &str = "mahoganyhomessack";
pub const SACK_KEY: &str = "plankcount";

// Marker storage ----------------------------------------------------------
pub const PLAIN_MARKER_CONFIG_GROUP: &str = "screenmarkers";
pub const PLAIN_MARKER_KEY: &str = "markers";
pub const GROUPED_MARKER_CONFIG_GROUP: &str = "screenmarkergroups";
pub const GROUPED_MARKER_KEY: &str = "markerGroups";
pub(crate) const MARKER_REF_SEPARATOR: char = '|';
pub(crate) const MARKER_REF_NULL_GROUP: &str = "null";

// Supply defaults ---------------------------------------------------------
pub(crate) const DEFAULT_MIN_PLANKS: i32 = 10;
pub(crate) const DEFAULT_MIN_STEEL_BARS: i32 = 1;
