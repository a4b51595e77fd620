//! Sparse, mutable, copy-on-write volumetric RGBA voxel store.
//!
//! A [`Volume`] is a logically infinite 3-D grid of [`Rgba`] samples
//! (alpha `0` meaning "no voxel"), stored as a sparse table of fixed-size
//! [`ChunkData`] tiles. Cloning a volume is O(1) (the chunk table is
//! reference-counted and forked lazily on first write); painting, merging,
//! moving, and selecting are the operations the rest of a voxel editor is
//! built from. Rendering, meshing, serialization, and undo are out of scope
//! — see the crate's design notes for the full boundary.

pub mod bbox;
pub mod chunk_data;
pub mod chunk_table;
pub mod color;
pub mod cow_chunk;
pub mod faces;
pub mod iter;
pub mod merge;
pub mod painter;
pub mod selector;
pub mod shapes;
pub mod transform;
pub mod volume;

pub use bbox::{Aabb, AabbF, BrushBox};
pub use chunk_data::{ChunkData, CHUNK_SIZE, CHUNK_VOLUME};
pub use color::{Rgba, TRANSPARENT};
pub use faces::FACES_NORMALS;
pub use iter::{ChunkIter, VoxelIter};
pub use merge::merge as merge_volumes;
pub use painter::{apply as apply_painter, Mode, Painter};
pub use selector::select;
pub use shapes::Shape;
pub use transform::{extrude, mv as move_volume};
pub use volume::{Accessor, Volume};
