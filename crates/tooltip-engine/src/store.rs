//! Hover and sticky tooltip records of one chart

use tooltip_shared::{DataPointRef, Position, Slot, TooltipTheme};
use uuid::Uuid;

use crate::host::{ChartHost, TooltipNode, TooltipSurface};
use crate::overlay::OverlayRegistry;

/// One active tooltip slot
#[derive(Debug)]
pub struct TooltipRecord<N> {
    /// Last computed placement; frozen once the record is pinned
    pub position: Position,
    pub node: N,
    pub node_id: String,
    /// Set on the sticky record only
    pub pinned_point: Option<DataPointRef>,
}

/// Holds at most one hover and one sticky record.
///
/// Sticky records are never created directly: a hover record is pinned to a
/// point and turns sticky, and unpinning turns it back into the hover record.
/// A record's node exists and is registered with the overlay container for
/// exactly as long as the record is in the store.
pub struct TooltipStore<S: TooltipSurface> {
    chart_id: Uuid,
    container_id: String,
    theme: Option<TooltipTheme>,
    hover: Option<TooltipRecord<S::Node>>,
    sticky: Option<TooltipRecord<S::Node>>,
    next_node: u64,
}

impl<S: TooltipSurface> TooltipStore<S> {
    pub fn new(chart_id: Uuid, container_id: impl Into<String>, theme: Option<TooltipTheme>) -> Self {
        Self {
            chart_id,
            container_id: container_id.into(),
            theme,
            hover: None,
            sticky: None,
            next_node: 0,
        }
    }

    pub fn chart_id(&self) -> Uuid {
        self.chart_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn get(&self, slot: Slot) -> Option<&TooltipRecord<S::Node>> {
        match slot {
            Slot::Hover => self.hover.as_ref(),
            Slot::Sticky => self.sticky.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut TooltipRecord<S::Node>> {
        self.slot_mut(slot).as_mut()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    pub fn len(&self) -> usize {
        self.hover.is_some() as usize + self.sticky.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point the sticky tooltip is pinned to
    pub fn sticky_point(&self) -> Option<&DataPointRef> {
        self.sticky.as_ref().and_then(|record| record.pinned_point.as_ref())
    }

    /// Existing hover record, or a new one with a hidden node attached to the
    /// shared container
    pub fn get_or_create_hover(&mut self, surface: &mut S) -> Option<&mut TooltipRecord<S::Node>> {
        if self.hover.is_none() {
            let node_id = format!("{}-{}-{}", self.container_id, self.chart_id, self.next_node);
            self.next_node += 1;

            OverlayRegistry::attach_node(&self.container_id, self.chart_id, &node_id);
            surface.ensure_container(&self.container_id);

            let Some(mut node) = surface.create_node(&self.container_id, &node_id, self.theme.as_ref())
            else {
                log::warn!("Surface could not create tooltip node {node_id}");
                OverlayRegistry::detach_node(&self.container_id, &node_id);
                return None;
            };

            node.hide();
            log::debug!("Created hover tooltip {node_id}");
            self.hover = Some(TooltipRecord {
                position: Position::default(),
                node,
                node_id,
                pinned_point: None,
            });
        }

        self.hover.as_mut()
    }

    /// Detach the slot's node and drop the record. Removing the sticky record
    /// also clears the host's highlight on the pinned point.
    pub fn remove(&mut self, slot: Slot, host: &dyn ChartHost) -> Option<TooltipRecord<S::Node>> {
        let mut record = self.slot_mut(slot).take()?;

        record.node.detach();
        OverlayRegistry::detach_node(&self.container_id, &record.node_id);

        if let Some(point) = record.pinned_point {
            host.unhighlight(point.series_index, point.data_index);
        }

        log::debug!("Removed {slot} tooltip {}", record.node_id);
        Some(record)
    }

    /// Turn the hover record into the sticky record pinned to `point`
    pub fn pin(&mut self, point: DataPointRef, host: &dyn ChartHost) -> Option<&mut TooltipRecord<S::Node>> {
        let record = self.promote(Slot::Hover, Slot::Sticky, host)?;
        record.pinned_point = Some(point);
        Some(record)
    }

    /// Turn the sticky record back into the hover record, returning the point
    /// it was pinned to. The host highlight is left for the caller to clear.
    pub fn unpin(&mut self, host: &dyn ChartHost) -> Option<DataPointRef> {
        let record = self.promote(Slot::Sticky, Slot::Hover, host)?;
        record.pinned_point.take()
    }

    /// Remove both records
    pub fn clear(&mut self, host: &dyn ChartHost) {
        self.remove(Slot::Hover, host);
        self.remove(Slot::Sticky, host);
    }

    /// Move a record to another slot, keeping its node so nothing flickers.
    /// Whatever occupied the destination is removed first.
    fn promote(&mut self, from: Slot, to: Slot, host: &dyn ChartHost) -> Option<&mut TooltipRecord<S::Node>> {
        if from == to {
            return self.get_mut(to);
        }

        let record = self.slot_mut(from).take()?;
        self.remove(to, host);

        log::debug!("Moved tooltip {} from {from} to {to}", record.node_id);
        let destination = self.slot_mut(to);
        *destination = Some(record);
        destination.as_mut()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<TooltipRecord<S::Node>> {
        match slot {
            Slot::Hover => &mut self.hover,
            Slot::Sticky => &mut self.sticky,
        }
    }
}
