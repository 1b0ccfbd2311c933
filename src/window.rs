use serde::{Deserialize, Serialize};

use crate::context_menu::{ContextAction, ItemId, MenuItem, Submenu};
use crate::core::Address;

/// What the caller knows about the address it wants to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressTypeHint {
    Data,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    Decompiler,
    Hexdump,
}

impl ViewKind {
    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Decompiler => "Decompiler",
            ViewKind::Hexdump => "Hexdump",
        }
    }

    pub fn accepts(&self, hint: Option<AddressTypeHint>) -> bool {
        match (self, hint) {
            (ViewKind::Decompiler, Some(AddressTypeHint::Data)) => false,
            _ => true,
        }
    }
}

/// Services of the application window the menu relies on.
pub trait MainWindow {
    fn create_show_in_menu(&self, address: Address, hint: Option<AddressTypeHint>) -> Submenu;
    fn show_in(&mut self, address: Address, view: ViewKind);
    fn refresh_all(&mut self);
}

/// Builds the standard "Show in" submenu: one entry per hosted view that
/// accepts the hint.
pub fn build_show_in_menu(
    views: &[ViewKind],
    address: Address,
    hint: Option<AddressTypeHint>,
) -> Submenu {
    let mut menu = Submenu::new("Show in");
    for view in views.iter().filter(|v| v.accepts(hint)) {
        menu.push(MenuItem::new(
            ItemId::ShowInView,
            view.title(),
            Some(ContextAction::ShowIn {
                address,
                view: *view,
            }),
        ));
    }
    menu
}
