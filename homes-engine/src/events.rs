//! Notifications delivered by the host client.
//!
//! Events are plain data so a session can be recorded and replayed.
use serde::{Deserialize, Serialize};

use crate::chat::ChatChannel;
use crate::config::HelperConfig;
use crate::constants::{
    INVENTORY_WIDGET_PARAM, ITEM_PLANK_SACK, OPTION_BUILD, OPTION_EMPTY,
    OPTION_EMPTY_TO_INVENTORY, OPTION_FILL, OPTION_FILL_FROM_INVENTORY, OPTION_REPAIR, OPTION_USE,
    SACK_MENU_TARGET,
};
use crate::inventory::ItemStack;
use crate::plank::PlankGrade;

/// One host notification, processed strictly in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    ChatLine {
        #[serde(default)]
        channel: ChatChannel,
        text: String,
    },
    /// A container changed. `items` is `None` when the container is gone
    /// (logged out, loading) and otherwise lists slots in order.
    InventoryChanged {
        container_id: i32,
        #[serde(default)]
        items: Option<Vec<ItemStack>>,
    },
    MenuAction(MenuActionEvent),
    /// A construction menu entry was drawn.
    BuildMenuTrigger,
    BuildMenuSlotRedraw {
        slot: usize,
        materials_text: String,
        buildable: bool,
    },
    BuildSlotConfirmed {
        slot: usize,
    },
    Tick,
    LoggedIn,
    ConfigChanged(HelperConfig),
}

impl HostEvent {
    /// Short label for logs and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ChatLine { .. } => "chat_line",
            Self::InventoryChanged { .. } => "inventory_changed",
            Self::MenuAction(_) => "menu_action",
            Self::BuildMenuTrigger => "build_menu_trigger",
            Self::BuildMenuSlotRedraw { .. } => "build_menu_slot_redraw",
            Self::BuildSlotConfirmed { .. } => "build_slot_confirmed",
            Self::Tick => "tick",
            Self::LoggedIn => "logged_in",
            Self::ConfigChanged(_) => "config_changed",
        }
    }
}

/// How the client dispatched a menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuActionKind {
    #[default]
    Other,
    /// Component operation on a widget, such as an inventory slot.
    CcOp,
    /// Using the selected item on another widget item.
    WidgetTargetOnWidget,
}

/// Widget details attached to a menu action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuWidget {
    #[serde(default)]
    pub kind: MenuActionKind,
    #[serde(default)]
    pub param0: i32,
    #[serde(default)]
    pub param1: i32,
    /// Item on the currently selected widget, for use-item-on-item.
    #[serde(default)]
    pub selected_item_id: Option<i32>,
}

const fn no_id() -> i32 {
    -1
}

/// A clicked menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuActionEvent {
    pub option: String,
    #[serde(default)]
    pub target: String,
    /// Scene object identifier; positive for game objects.
    #[serde(default = "no_id")]
    pub object_id: i32,
    #[serde(default = "no_id")]
    pub item_id: i32,
    #[serde(default)]
    pub widget: MenuWidget,
}

fn is_item(id: i32, item: u32) -> bool {
    u32::try_from(id).is_ok_and(|id| id == item)
}

fn is_plank(id: i32) -> bool {
    u32::try_from(id).is_ok_and(PlankGrade::is_plank)
}

impl MenuActionEvent {
    #[must_use]
    pub fn new(option: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            target: target.into(),
            object_id: no_id(),
            item_id: no_id(),
            widget: MenuWidget::default(),
        }
    }

    #[must_use]
    pub const fn with_object(mut self, object_id: i32) -> Self {
        self.object_id = object_id;
        self
    }

    #[must_use]
    pub const fn with_item(mut self, item_id: i32) -> Self {
        self.item_id = item_id;
        self
    }

    #[must_use]
    pub const fn with_widget(mut self, widget: MenuWidget) -> Self {
        self.widget = widget;
        self
    }

    /// Whether this action moves planks between the inventory and the sack.
    ///
    /// `inventory` is the main inventory in slot order, used to resolve
    /// operations on an inventory slot.
    #[must_use]
    pub fn is_sack_interaction(&self, inventory: Option<&[ItemStack]>) -> bool {
        let option = self.option.as_str();
        let on_sack_target = self.target == SACK_MENU_TARGET;

        if is_item(self.item_id, ITEM_PLANK_SACK) && (option == OPTION_FILL || option == OPTION_EMPTY) {
            return true;
        }
        if on_sack_target && option == OPTION_USE {
            return true;
        }
        if option == OPTION_USE
            && self.widget.kind == MenuActionKind::CcOp
            && self.widget.param1 == INVENTORY_WIDGET_PARAM
        {
            return self.slot_holds_sack(inventory);
        }
        if option == OPTION_USE && self.widget.kind == MenuActionKind::WidgetTargetOnWidget {
            if inventory.is_none() {
                return false;
            }
            let Some(selected) = self.widget.selected_item_id else {
                return false;
            };
            return (is_item(selected, ITEM_PLANK_SACK) && is_plank(self.item_id))
                || (is_plank(selected) && is_item(self.item_id, ITEM_PLANK_SACK));
        }
        on_sack_target && (option == OPTION_FILL_FROM_INVENTORY || option == OPTION_EMPTY_TO_INVENTORY)
    }

    fn slot_holds_sack(&self, inventory: Option<&[ItemStack]>) -> bool {
        let Some(items) = inventory else {
            return false;
        };
        usize::try_from(self.widget.param0)
            .ok()
            .and_then(|slot| items.get(slot))
            .is_some_and(|item| item.id == ITEM_PLANK_SACK)
    }

    /// Whether this is a repair or build click on a scene object.
    #[must_use]
    pub fn is_furniture_action(&self) -> bool {
        self.option == OPTION_REPAIR || self.option == OPTION_BUILD
    }
}
