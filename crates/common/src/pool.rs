// Copyright (C) 2023 gigablaster

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use crate::HandleContainer;

/// Generational slot pool. Thin alias over [`HandleContainer`] under the name the
/// asset-cache and GPU-cache layers reach for when the "hot" part doubles as the
/// stored value and there is no separate cold payload.
pub type Pool<T, U> = HandleContainer<T, U>;
