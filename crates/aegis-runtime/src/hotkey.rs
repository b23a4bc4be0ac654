//! Global hotkey dispatcher.
//!
//! Receives every key event of a tab regardless of which element has
//! focus, tracks which keys are down, and fires a registered callback
//! when its combination becomes satisfied.
//!
//! Modifiers (`Control`, `Shift`, `Alt`, `Meta`) are taken from the
//! event's modifier state rather than from tracked key-downs, so a
//! modifier pressed before focus arrived still counts.

use aegis_types::ErrorCode;
use bitflags::bitflags;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::{debug, trace};

bitflags! {
    /// Modifier key state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CONTROL = 0b0001;
        const SHIFT   = 0b0010;
        const ALT     = 0b0100;
        const META    = 0b1000;
    }
}

impl Modifiers {
    /// Maps a host key name (`"Control"`, `"ctrl"`, `"Cmd"`, ...) to its flag.
    fn from_key_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "control" | "ctrl" => Some(Self::CONTROL),
            "shift" => Some(Self::SHIFT),
            "alt" | "option" => Some(Self::ALT),
            "meta" | "cmd" | "command" | "super" => Some(Self::META),
            _ => None,
        }
    }
}

/// A combination string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    /// The combination names no key at all.
    #[error("hotkey '{0}' is empty")]
    Empty(String),

    /// An empty segment such as `"Control++X"`.
    #[error("hotkey '{0}' has an empty segment")]
    EmptySegment(String),
}

impl ErrorCode for HotkeyError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty(_) => "HOTKEY_EMPTY",
            Self::EmptySegment(_) => "HOTKEY_EMPTY_SEGMENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// A set of key tokens that must all be held, e.g. `Control+Shift+X`.
///
/// Any mix of modifiers and other keys is allowed, including several
/// non-modifier keys (`Control+A+B`) or modifiers alone (`Control+Shift`).
/// Key names compare case-insensitively and order does not matter.
///
/// # Example
///
/// ```
/// use aegis_runtime::hotkey::{KeyCombo, Modifiers};
///
/// let combo: KeyCombo = "Control+Shift+X".parse().unwrap();
/// assert_eq!(combo.modifiers(), Modifiers::CONTROL | Modifiers::SHIFT);
/// assert!(combo.keys().eq(["x"]));
/// assert_eq!(combo, "x+shift+ctrl".parse().unwrap());
/// assert!("".parse::<KeyCombo>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    modifiers: Modifiers,
    keys: BTreeSet<String>,
}

impl KeyCombo {
    /// Modifiers that must be held.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Non-modifier keys, lowercased, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    fn is_satisfied(&self, held: Modifiers, pressed: &HashSet<String>) -> bool {
        held.contains(self.modifiers) && self.keys.iter().all(|key| pressed.contains(key))
    }
}

impl FromStr for KeyCombo {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(HotkeyError::Empty(s.to_string()));
        }

        let mut modifiers = Modifiers::empty();
        let mut keys = BTreeSet::new();

        for segment in s.split('+').map(str::trim) {
            if segment.is_empty() {
                return Err(HotkeyError::EmptySegment(s.to_string()));
            }
            match Modifiers::from_key_name(segment) {
                Some(modifier) => modifiers |= modifier,
                None => {
                    keys.insert(segment.to_lowercase());
                }
            }
        }

        Ok(Self { modifiers, keys })
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        for (flag, name) in [
            (Modifiers::CONTROL, "Control"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::META, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                parts.push(name.to_string());
            }
        }
        parts.extend(self.keys.iter().map(|key| key.to_uppercase()));
        f.write_str(&parts.join("+"))
    }
}

/// A key-down or key-up as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key name as reported by the host (`"X"`, `"Shift"`, ...).
    pub key: String,
    /// Modifier state at the time of the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

/// What the dispatcher did with a key-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The host should suppress its default action.
    pub prevent_default: bool,
    /// Number of callbacks invoked.
    pub fired: usize,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Binding {
    id: u64,
    combo: KeyCombo,
    callback: Callback,
    /// Satisfied as of the last event; cleared when the combo breaks.
    engaged: bool,
}

#[derive(Default)]
struct DispatchState {
    pressed: HashSet<String>,
    bindings: Vec<Binding>,
    next_id: u64,
}

impl DispatchState {
    /// Re-evaluates every binding against `held`; returns callbacks whose
    /// combo just became satisfied, and whether any combo is satisfied.
    fn transition(&mut self, held: Modifiers) -> (Vec<Callback>, bool) {
        let mut fire = Vec::new();
        let mut any_satisfied = false;

        for binding in &mut self.bindings {
            let satisfied = binding.combo.is_satisfied(held, &self.pressed);
            if satisfied {
                any_satisfied = true;
                if !binding.engaged {
                    debug!(combo = %binding.combo, "Hotkey fired");
                    fire.push(Arc::clone(&binding.callback));
                }
            }
            binding.engaged = satisfied;
        }

        (fire, any_satisfied)
    }
}

/// Routes key events to registered combinations.
///
/// Cheap to clone; clones share registrations and key state.
///
/// # Example
///
/// ```
/// use aegis_runtime::hotkey::{HotkeyDispatcher, KeyEvent, Modifiers};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let dispatcher = HotkeyDispatcher::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// let guard = dispatcher
///     .register("Control+Shift+X".parse().unwrap(), move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     });
///
/// let held = Modifiers::CONTROL | Modifiers::SHIFT;
/// let outcome = dispatcher.key_down(&KeyEvent::new("X", held));
/// assert!(outcome.prevent_default);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
///
/// drop(guard);
/// dispatcher.key_up(&KeyEvent::new("X", held));
/// dispatcher.key_down(&KeyEvent::new("X", held));
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct HotkeyDispatcher {
    state: Arc<Mutex<DispatchState>>,
}

impl HotkeyDispatcher {
    /// Creates a dispatcher with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `combo`.
    ///
    /// The registration lives as long as the returned guard.
    #[must_use = "dropping the guard unregisters the hotkey"]
    pub fn register<F>(&self, combo: KeyCombo, callback: F) -> HotkeyGuard
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        debug!(id, combo = %combo, "Hotkey registered");
        state.bindings.push(Binding {
            id,
            combo,
            callback: Arc::new(callback),
            engaged: false,
        });

        HotkeyGuard {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Handles a key-down.
    ///
    /// Callbacks run after the internal lock is released, so they may
    /// register or drop hotkeys themselves.
    pub fn key_down(&self, event: &KeyEvent) -> KeyOutcome {
        let (fire, satisfied) = {
            let mut state = self.state.lock();
            if Modifiers::from_key_name(&event.key).is_none() {
                state.pressed.insert(event.key.to_lowercase());
            }
            state.transition(event.modifiers)
        };
        trace!(key = %event.key, satisfied, "Key down");

        for callback in &fire {
            callback();
        }

        KeyOutcome {
            prevent_default: satisfied,
            fired: fire.len(),
        }
    }

    /// Handles a key-up.
    pub fn key_up(&self, event: &KeyEvent) {
        let mut state = self.state.lock();
        state.pressed.remove(&event.key.to_lowercase());
        // Releasing can only break combos, so nothing fires here.
        let _ = state.transition(event.modifiers);
    }

    /// Forgets every held key, e.g. when the window loses focus and
    /// key-ups will never arrive.
    pub fn clear_pressed(&self) {
        let mut state = self.state.lock();
        state.pressed.clear();
        for binding in &mut state.bindings {
            binding.engaged = false;
        }
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().bindings.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HotkeyDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HotkeyDispatcher")
            .field("bindings", &state.bindings.len())
            .field("pressed", &state.pressed)
            .finish()
    }
}

/// Keeps a hotkey registered; dropping it unregisters.
#[derive(Debug)]
pub struct HotkeyGuard {
    id: u64,
    state: Weak<Mutex<DispatchState>>,
}

impl Drop for HotkeyGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.lock().bindings.retain(|b| b.id != self.id);
            debug!(id = self.id, "Hotkey unregistered");
        }
    }
}
