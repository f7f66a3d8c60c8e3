//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::parser::parse_archetypes;
use crate::registry::{ArchetypeRegistry, RegistryBuilder};
use crate::validation::Diagnostics;

pub(crate) const ARCHETYPES: &str = "\
Object floor
type 71
face floor.111
is_floor 1
no_pick 1
end
Object chest
name wooden chest
type 122
face chest.111
weight 2000
end
Object sign
type 98
face sign.111
msg
Welcome.
endmsg
end
Object orc
face orc.111
alive 1
monster 1
level 3
end
Object exit
type 66
face exit.111
end
Object event_apply
type 118
sub_type 1
end
Object bigtree
face tree.111
end
More
Object bigtree_2
face tree.112
x 1
end
More
Object bigtree_3
face tree.113
y 1
end
More
Object bigtree_4
face tree.114
x 1
y 1
end
Object gate
face gate.111
direction 3
end
More
Object gate_2
face gate.112
x 1
end
";

pub(crate) fn wall_names() -> Vec<String> {
    (0..16).map(|i| format!("wall_{:02}", i)).collect()
}

/// Registry with the fixture archetypes and a 16-wall join list.
pub(crate) fn registry() -> Arc<ArchetypeRegistry> {
    let mut source = ARCHETYPES.to_string();
    for name in wall_names() {
        source.push_str(&format!("Object {}\nface {}.111\nno_pass 1\nend\n", name, name));
    }

    let mut diagnostics = Diagnostics::new();
    let archetypes = parse_archetypes(&source, Some("test"), &mut diagnostics);
    let mut builder = RegistryBuilder::new();
    builder.add_archetypes(archetypes).add_join_list(wall_names());
    let registry = builder.build(&mut diagnostics);
    assert!(!diagnostics.has_errors(), "{:?}", diagnostics);
    Arc::new(registry)
}
