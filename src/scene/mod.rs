//! Scene graph: camera, orbit interaction, lights and the composer that ties them to a mesh.

pub mod camera;
pub mod composer;
pub mod lights;
pub mod orbit;
