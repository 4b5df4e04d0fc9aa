//! End-to-end scenarios for the synchronization engine: attach/detach
//! invariants, ownership isolation, default geometry correction, server-only
//! tracking, and structural mutation from inside tick hooks.

use std::sync::Arc;

use aurora_gui::{
    shared, Container, ExtensionId, Label, PacketSink, Screen, SharedWidget, TickContext, Widget,
    WidgetBase, WidgetError, WidgetRegistry,
};
use aurora_protocol::{OutboundPacket, Packet, PacketReader, ViewerId, WidgetId};
use parking_lot::Mutex;

struct RecordingSink {
    sent: Mutex<Vec<OutboundPacket>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn drain(&self) -> Vec<OutboundPacket> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl PacketSink for RecordingSink {
    fn send(&self, packet: OutboundPacket) {
        self.sent.lock().push(packet);
    }
}

fn new_screen(sink: &Arc<RecordingSink>) -> (Arc<WidgetRegistry>, Screen) {
    let registry = Arc::new(WidgetRegistry::new());
    let screen = Screen::new_root(registry.clone(), sink.clone(), ViewerId(1));
    (registry, screen)
}

fn sized_label(text: &str) -> SharedWidget {
    let mut label = Label::new(text);
    label.base_mut().set_x(5);
    label.base_mut().set_y(5);
    label.base_mut().set_width(60);
    label.base_mut().set_height(10);
    shared(label)
}

fn state_packets_for(packets: &[OutboundPacket], id: WidgetId) -> usize {
    packets
        .iter()
        .filter(|p| matches!(&p.packet, Packet::WidgetState(s) if s.widget_id == id))
        .count()
}

fn remove_packets_for(packets: &[OutboundPacket], id: WidgetId) -> usize {
    packets
        .iter()
        .filter(|p| matches!(&p.packet, Packet::WidgetRemove(r) if r.widget_id == id))
        .count()
}

#[test]
fn attach_records_ownership_and_back_reference() {
    let sink = RecordingSink::new();
    let (_, screen) = new_screen(&sink);
    let label = sized_label("hp");
    let id = label.read().base().id();

    screen.attach(ExtensionId(3), &label).unwrap();

    assert!(screen.contains(id));
    assert_eq!(screen.owner_of(id), Some(ExtensionId(3)));
    assert_eq!(label.read().base().screen(), Some(screen.id()));
    assert_eq!(label.read().base().owner(), Some(ExtensionId(3)));
    assert!(label.read().base().is_dirty());
}

#[test]
fn detach_emits_exactly_one_removal_notice() {
    let sink = RecordingSink::new();
    let (_, screen) = new_screen(&sink);
    let label = sized_label("hp");
    let id = label.read().base().id();

    screen.attach(ExtensionId(3), &label).unwrap();
    sink.drain();

    assert!(screen.detach(id));
    let packets = sink.drain();
    assert_eq!(remove_packets_for(&packets, id), 1);
    assert_eq!(packets.len(), 1);
    assert!(!screen.contains(id));
    assert!(label.read().base().screen().is_none());
    assert!(label.read().base().owner().is_none());

    // Detaching again is a no-op with no second notice.
    assert!(!screen.detach(id));
    assert!(sink.drain().is_empty());
}

#[test]
fn detaching_server_only_widget_emits_nothing() {
    let sink = RecordingSink::new();
    let (_, screen) = new_screen(&sink);
    let container = shared(Container::new());
    let id = container.read().base().id();

    screen.attach(ExtensionId(2), &container).unwrap();
    sink.drain();

    assert!(screen.detach(id));
    assert!(sink.drain().is_empty());
}

#[test]
fn bulk_detach_spares_other_extensions_and_core() {
    let sink = RecordingSink::new();
    let (_, screen) = new_screen(&sink);

    let chrome = sized_label("core chrome");
    let first = sized_label("ext one");
    let second = sized_label("ext two");
    screen.attach(ExtensionId::CORE, &chrome).unwrap();
    screen.attach(ExtensionId(1), &first).unwrap();
    screen.attach(ExtensionId(2), &second).unwrap();

    assert_eq!(screen.detach_all_owned_by(ExtensionId(1)), 1);

    assert!(!screen.contains(first.read().base().id()));
    assert!(screen.contains(second.read().base().id()));
    assert!(screen.contains(chrome.read().base().id()));
    assert_eq!(second.read().base().owner(), Some(ExtensionId(2)));

    // Bulk-detaching the core itself is refused outright.
    assert_eq!(screen.detach_all_owned_by(ExtensionId::CORE), 0);
    assert!(screen.contains(chrome.read().base().id()));
}

#[test]
fn replace_keeps_owner_and_identity() {
    let sink = RecordingSink::new();
    let (_, screen) = new_screen(&sink);
    let label = sized_label("hp: 10");
    let id = label.read().base().id();
    screen.attach(ExtensionId(5), &label).unwrap();

    // A new instance under the same identity takes the old one's place.
    let replacement = {
        let guard = label.read();
        let mut fresh = Label::new("hp: 12");
        fresh.base_mut().clone_from(guard.base());
        shared(fresh)
    };
    assert!(screen.replace(&replacement));
    assert_eq!(screen.owner_of(id), Some(ExtensionId(5)));
    let attached = screen.find(id).unwrap();
    assert!(Arc::ptr_eq(&attached, &replacement));

    // Replacing an identity that is not attached reports failure.
    assert!(!screen.replace(&sized_label("stranger")));
}

#[test]
fn dirty_cascade_reaches_nested_screens() {
    let sink = RecordingSink::new();
    let registry = Arc::new(WidgetRegistry::new());
    let mut root = Screen::new_root(registry.clone(), sink.clone(), ViewerId(1));

    let popup = Screen::popup(registry, sink.clone(), ViewerId(1));
    let inner = sized_label("popup text");
    popup.attach(ExtensionId(1), &inner).unwrap();
    let popup = shared(popup);
    root.attach(ExtensionId(1), &popup).unwrap();

    inner.write().base_mut().set_dirty(false);
    popup.write().base_mut().set_dirty(false);

    Widget::set_dirty(&mut root, true);
    assert!(popup.read().base().is_dirty());
    assert!(inner.read().base().is_dirty());
}

#[test]
fn missing_size_gets_default_and_exactly_one_state_packet() {
    let sink = RecordingSink::new();
    let (_, mut screen) = new_screen(&sink);
    screen.run_tick();
    sink.drain();

    // Width set explicitly to zero, height never set.
    let mut label = Label::new("bare");
    label.base_mut().set_x(10);
    label.base_mut().set_y(12);
    label.base_mut().set_width(0);
    let label = shared(label);
    let id = label.read().base().id();
    screen.attach(ExtensionId(9), &label).unwrap();

    screen.run_tick();
    let packets = sink.drain();
    assert_eq!(packets.len(), 1);
    assert_eq!(state_packets_for(&packets, id), 1);

    // The pushed payload carries the corrected (explicit) geometry.
    let Packet::WidgetState(state) = &packets[0].packet else {
        panic!("expected a state packet");
    };
    let mut decoded = Label::new("");
    let mut reader = PacketReader::new(&state.payload);
    decoded.read_data(&mut reader, state.version).unwrap();
    assert_eq!(decoded.base().width(), 0);
    assert_eq!(decoded.base().height(), 50);
    assert_eq!(decoded.base().x(), 10);

    // The widget itself now has explicit geometry and a clean flag.
    assert!(label.read().base().has_size());
    assert!(!label.read().base().is_dirty());

    // Nothing further goes out while the widget stays clean.
    screen.run_tick();
    assert!(sink.drain().is_empty());
}

#[test]
fn server_only_widget_is_tracked_but_never_transmitted() {
    let sink = RecordingSink::new();
    let (_, mut screen) = new_screen(&sink);
    screen.run_tick();
    sink.drain();

    let container = shared(Container::new());
    let id = container.read().base().id();
    screen.attach(ExtensionId(1), &container).unwrap();
    assert!(container.read().base().is_dirty());

    screen.run_tick();
    let packets = sink.drain();
    assert_eq!(state_packets_for(&packets, id), 0);
    assert!(packets.is_empty());
    // Dirty clears even though nothing was sent.
    assert!(!container.read().base().is_dirty());
}

#[test]
fn extension_deactivation_leaves_other_extensions_untouched() {
    let sink = RecordingSink::new();
    let (_, mut screen) = new_screen(&sink);

    let first = sized_label("ext one");
    let second = sized_label("ext two");
    screen.attach(ExtensionId(1), &first).unwrap();
    screen.attach(ExtensionId(2), &second).unwrap();
    screen.run_tick();
    sink.drain();

    // Extension 1 is deactivated: all of its widgets go, nothing else.
    screen.detach_all_owned_by(ExtensionId(1));
    let packets = sink.drain();
    assert_eq!(remove_packets_for(&packets, first.read().base().id()), 1);
    assert_eq!(packets.len(), 1);

    assert!(screen.contains(second.read().base().id()));
    assert_eq!(second.read().base().screen(), Some(screen.id()));

    second.write().base_mut().set_tooltip("still alive");
    screen.run_tick();
    let packets = sink.drain();
    assert_eq!(state_packets_for(&packets, second.read().base().id()), 1);
}

#[test]
fn nested_screen_children_sync_through_parent_tick() {
    let sink = RecordingSink::new();
    let registry = Arc::new(WidgetRegistry::new());
    let mut root = Screen::new_root(registry.clone(), sink.clone(), ViewerId(1));

    let popup = Screen::popup(registry, sink.clone(), ViewerId(1));
    let popup_id = popup.id();
    let inner = sized_label("popup text");
    let inner_id = inner.read().base().id();
    popup.attach(ExtensionId(1), &inner).unwrap();
    let popup = shared(popup);
    root.attach(ExtensionId(1), &popup).unwrap();

    root.run_tick();
    let packets = sink.drain();

    // The inner label is addressed to the popup, not the root.
    let inner_state = packets
        .iter()
        .find_map(|p| match &p.packet {
            Packet::WidgetState(s) if s.widget_id == inner_id => Some(s),
            _ => None,
        })
        .expect("inner label state");
    assert_eq!(inner_state.screen_id, popup_id);

    // The popup itself is swept by its parent.
    assert_eq!(state_packets_for(&packets, popup_id), 1);
    assert!(!popup.read().base().is_dirty());
}

/// Detaches itself through the tick context on its first update, once.
struct Ephemeral {
    base: WidgetBase,
    armed: bool,
}

impl Ephemeral {
    fn new(registry: &WidgetRegistry) -> Self {
        let type_id = registry.register("ephemeral_marker");
        let mut base = WidgetBase::new(type_id);
        base.set_x(0);
        base.set_y(0);
        base.set_width(8);
        base.set_height(8);
        Self { base, armed: true }
    }
}

impl Widget for Ephemeral {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn version(&self) -> u16 {
        1
    }

    fn write_data(
        &self,
        writer: &mut aurora_protocol::PacketWriter,
    ) -> Result<(), aurora_protocol::CodecError> {
        self.base.write_data(writer)
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        _version: u16,
    ) -> Result<(), aurora_protocol::CodecError> {
        self.base.read_data(reader)
    }

    fn on_tick(&mut self, ctx: &mut TickContext) -> Result<(), WidgetError> {
        if self.armed {
            self.armed = false;
            ctx.request_detach(self.base.id());
        }
        Ok(())
    }
}

#[test]
fn widget_can_detach_itself_mid_tick_and_reattach_later() {
    let sink = RecordingSink::new();
    let (registry, mut screen) = new_screen(&sink);
    screen.run_tick();
    sink.drain();

    let ephemeral = shared(Ephemeral::new(&registry));
    let id = ephemeral.read().base().id();
    screen.attach(ExtensionId(1), &ephemeral).unwrap();

    // The widget detaches itself during the update pass, so the removal
    // notice fires inside this tick and nothing is swept for it.
    screen.run_tick();
    let packets = sink.drain();
    assert_eq!(remove_packets_for(&packets, id), 1);
    assert_eq!(state_packets_for(&packets, id), 0);
    assert!(!screen.contains(id));

    // Reattaching the same identity produces a fresh state push.
    screen.attach(ExtensionId(1), &ephemeral).unwrap();
    screen.run_tick();
    let packets = sink.drain();
    assert_eq!(state_packets_for(&packets, id), 1);
}

/// Always fails its update hook.
struct Faulty {
    base: WidgetBase,
}

impl Faulty {
    fn new(registry: &WidgetRegistry) -> Self {
        let type_id = registry.register("faulty_probe");
        let mut base = WidgetBase::new(type_id);
        base.set_x(0);
        base.set_y(0);
        base.set_width(8);
        base.set_height(8);
        Self { base }
    }
}

impl Widget for Faulty {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn version(&self) -> u16 {
        1
    }

    fn write_data(
        &self,
        writer: &mut aurora_protocol::PacketWriter,
    ) -> Result<(), aurora_protocol::CodecError> {
        self.base.write_data(writer)
    }

    fn read_data(
        &mut self,
        reader: &mut PacketReader<'_>,
        _version: u16,
    ) -> Result<(), aurora_protocol::CodecError> {
        self.base.read_data(reader)
    }

    fn on_tick(&mut self, _ctx: &mut TickContext) -> Result<(), WidgetError> {
        Err(WidgetError::Hook("probe exploded".into()))
    }
}

#[test]
fn hook_failure_is_isolated_to_the_failing_widget() {
    let sink = RecordingSink::new();
    let (registry, mut screen) = new_screen(&sink);
    screen.run_tick();
    sink.drain();

    let faulty = shared(Faulty::new(&registry));
    let healthy = sized_label("survivor");
    screen.attach(ExtensionId(1), &faulty).unwrap();
    screen.attach(ExtensionId(2), &healthy).unwrap();

    screen.run_tick();
    let packets = sink.drain();

    // Both widgets stay attached, and the healthy one still synced.
    assert!(screen.contains(faulty.read().base().id()));
    assert!(screen.contains(healthy.read().base().id()));
    assert_eq!(state_packets_for(&packets, healthy.read().base().id()), 1);
    // The faulty widget is dirty-swept like any other.
    assert_eq!(state_packets_for(&packets, faulty.read().base().id()), 1);
}

#[test]
fn collect_all_flattens_nested_screens() {
    let sink = RecordingSink::new();
    let registry = Arc::new(WidgetRegistry::new());
    let root = Screen::new_root(registry.clone(), sink.clone(), ViewerId(1));

    let popup = Screen::popup(registry, sink.clone(), ViewerId(1));
    let inner = sized_label("inner");
    let inner_id = inner.read().base().id();
    popup.attach(ExtensionId(1), &inner).unwrap();
    let popup = shared(popup);
    root.attach(ExtensionId(1), &popup).unwrap();

    let outer_only = root.collect_all(false);
    assert_eq!(outer_only.len(), 1);

    let all = root.collect_all(true);
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|w| w.read().base().id() == inner_id));
}
