mod strict;

pub use strict::StrictRenderer;
