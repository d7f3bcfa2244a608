//! One layout pass: measurement bookkeeping and serialized placement.

use std::rc::Rc;

use tracing::{debug, trace};

use super::columns::ColumnHeights;
use super::sizing::LayoutConfig;
use super::types::{BitmapSize, BitmapState, Caption, ItemContent, LoadError, PassGeneration, Placement};
use super::{LayoutItem, Options};

/// Measurement state of one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Measure {
    /// Waiting for the bitmap's load-or-error event.
    Pending { caption: Caption },
    /// Natural card height is known.
    Measured(f64),
}

#[derive(Debug)]
struct Slot<Id> {
    id: Id,
    measure: Measure,
    placement: Option<Placement>,
}

/// A single layout pass over an ordered item sequence.
///
/// The pass owns the sizing config and the column heights; nothing of
/// either survives into the next pass. Measurement may settle in any
/// order, but placement is serialized: slots commit strictly in item
/// order behind the `committed` cursor, so the read-then-update of the
/// column heights is atomic per item and the final geometry does not
/// depend on load timing.
#[derive(Debug)]
pub struct LayoutPass<Id> {
    generation: PassGeneration,
    config: LayoutConfig,
    options: Rc<Options>,
    columns: ColumnHeights,
    slots: Vec<Slot<Id>>,
    /// Slots before this index are placed.
    committed: usize,
}

impl<Id: PartialEq + std::fmt::Debug + Clone> LayoutPass<Id> {
    pub(super) fn new<W>(
        generation: PassGeneration,
        config: LayoutConfig,
        options: Rc<Options>,
        items: &[W],
    ) -> Self
    where
        W: LayoutItem<Id = Id>,
    {
        let slots = items
            .iter()
            .map(|item| {
                let measure = match item.content() {
                    ItemContent::Folder => Measure::Measured(options.folder_height()),
                    ItemContent::Image {
                        bitmap: BitmapState::Loaded(size),
                        caption,
                    } => Measure::Measured(card_height(&options, &config, size, caption)),
                    ItemContent::Image {
                        bitmap: BitmapState::Failed,
                        ..
                    } => Measure::Measured(options.fallback_height(config.item_width)),
                    ItemContent::Image {
                        bitmap: BitmapState::Pending,
                        caption,
                    } => Measure::Pending { caption },
                };

                Slot {
                    id: item.id().clone(),
                    measure,
                    placement: None,
                }
            })
            .collect();

        let mut pass = Self {
            generation,
            config,
            options,
            columns: ColumnHeights::new(config.columns),
            slots,
            committed: 0,
        };
        pass.advance();
        pass
    }

    pub fn generation(&self) -> PassGeneration {
        self.generation
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Whether every item has been placed.
    pub fn is_complete(&self) -> bool {
        self.committed == self.slots.len()
    }

    /// The container height so far: the tallest column.
    pub fn container_height(&self) -> f64 {
        self.columns.max()
    }

    pub fn column_heights(&self) -> &ColumnHeights {
        &self.columns
    }

    /// Items still waiting for their bitmap, in item order.
    pub fn pending(&self) -> impl Iterator<Item = &Id> {
        self.slots.iter().filter_map(|slot| {
            matches!(slot.measure, Measure::Pending { .. }).then_some(&slot.id)
        })
    }

    /// Placements committed so far, in item order.
    pub fn placements(&self) -> impl Iterator<Item = (&Id, Placement)> {
        self.slots[..self.committed]
            .iter()
            .filter_map(|slot| slot.placement.map(|placement| (&slot.id, placement)))
    }

    pub fn placement_of(&self, id: &Id) -> Option<Placement> {
        self.slots
            .iter()
            .find(|slot| slot.id == *id)
            .and_then(|slot| slot.placement)
    }

    /// Records a settled bitmap measurement for `id`.
    ///
    /// Returns false if the pass holds no such item. A second settle for
    /// the same item is ignored; load and error are mutually exclusive, so
    /// this only happens on duplicated delivery.
    pub(super) fn resolve(&mut self, id: &Id, outcome: Result<BitmapSize, LoadError>) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == *id) else {
            return false;
        };

        let caption = match slot.measure {
            Measure::Pending { caption } => caption,
            Measure::Measured(_) => {
                debug!("ignoring duplicate measurement for item {id:?}");
                return true;
            }
        };

        let height = match outcome {
            Ok(size) => card_height(&self.options, &self.config, size, caption),
            Err(err) => {
                trace!("item {id:?} is unmeasurable ({err}), using fallback height");
                self.options.fallback_height(self.config.item_width)
            }
        };
        slot.measure = Measure::Measured(height);

        self.advance();
        true
    }

    /// Commits every measured slot at the head of the queue.
    ///
    /// Each commit picks the shortest column, assigns the placement and
    /// grows that column, one slot at a time. Returns how many slots were
    /// placed.
    fn advance(&mut self) -> usize {
        let placed_before = self.committed;

        while let Some(slot) = self.slots.get_mut(self.committed) {
            let Measure::Measured(height) = slot.measure else {
                break;
            };

            let column = self.columns.shortest();
            slot.placement = Some(Placement {
                x: column as f64 * (self.config.item_width + self.config.gap),
                y: self.columns.get(column),
                width: self.config.item_width,
                height,
            });
            self.columns.add(column, height + self.config.gap);
            self.committed += 1;
        }

        self.committed - placed_before
    }

    #[cfg(test)]
    pub fn verify_invariants(&self) {
        assert!(self.committed <= self.slots.len());
        assert_eq!(self.columns.len(), self.config.columns);

        // Committed prefix is placed, the rest is not.
        for (idx, slot) in self.slots.iter().enumerate() {
            if idx < self.committed {
                assert!(slot.placement.is_some(), "committed slot {idx} unplaced");
                assert!(
                    matches!(slot.measure, Measure::Measured(_)),
                    "committed slot {idx} unmeasured"
                );
            } else {
                assert!(slot.placement.is_none(), "uncommitted slot {idx} placed");
            }
        }

        // Replaying the committed placements must reproduce the column
        // heights exactly.
        let mut replay = ColumnHeights::new(self.config.columns);
        for slot in &self.slots[..self.committed] {
            let placement = slot.placement.unwrap();
            let column = replay.shortest();
            assert_eq!(
                placement.x,
                column as f64 * (self.config.item_width + self.config.gap),
                "placement not in the shortest column"
            );
            assert_eq!(placement.y, replay.get(column));
            assert_eq!(placement.width, self.config.item_width);
            replay.add(column, placement.height + self.config.gap);
        }
        assert_eq!(replay, self.columns);
        assert_eq!(self.container_height(), self.columns.max());

        // Placements stay inside the container.
        for (_, placement) in self.placements() {
            assert!(placement.x >= 0.);
            assert!(
                placement.x + placement.width <= self.config.container_width,
                "placement overflows the container"
            );
        }
    }
}

/// Natural card height for a measured bitmap.
///
/// The picture area scales the bitmap to the card width; caption rows add
/// their fixed height on top. A degenerate zero-sized bitmap measures like
/// a failed load.
fn card_height(
    options: &Options,
    config: &LayoutConfig,
    size: BitmapSize,
    caption: Caption,
) -> f64 {
    match size.aspect() {
        Some(aspect) => config.item_width * aspect + options.caption_height(caption),
        None => options.fallback_height(config.item_width),
    }
}
