use goblin::Object;

use super::Arch;

/// Architecture a native binary was built for, read from its header.
///
/// Returns `None` for anything goblin cannot parse, for universal (fat)
/// Mach-O files, and for machine types without a canonical identifier.
pub fn binary_arch(bytes: &[u8]) -> Option<Arch> {
    match Object::parse(bytes).ok()? {
        Object::Elf(elf) => match elf.header.e_machine {
            goblin::elf::header::EM_X86_64 => Some(Arch::X86_64),
            goblin::elf::header::EM_AARCH64 => Some(Arch::Aarch64),
            _ => None,
        },
        Object::Mach(goblin::mach::Mach::Binary(macho)) => match macho.header.cputype {
            goblin::mach::cputype::CPU_TYPE_X86_64 => Some(Arch::X86_64),
            goblin::mach::cputype::CPU_TYPE_ARM64 => Some(Arch::Aarch64),
            _ => None,
        },
        Object::PE(pe) => match pe.header.coff_header.machine {
            goblin::pe::header::COFF_MACHINE_X86_64 => Some(Arch::X86_64),
            goblin::pe::header::COFF_MACHINE_ARM64 => Some(Arch::Aarch64),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    fn test_binary_arch_of_running_executable() {
        #[cfg(target_arch = "x86_64")]
        let expected = Arch::X86_64;
        #[cfg(target_arch = "aarch64")]
        let expected = Arch::Aarch64;

        let exe = std::env::current_exe().unwrap();
        let bytes = std::fs::read(exe).unwrap();
        assert_eq!(binary_arch(&bytes), Some(expected));
    }

    #[test]
    fn test_binary_arch_of_script_is_none() {
        assert_eq!(binary_arch(b"#!/bin/sh\necho hello\n"), None);
        assert_eq!(binary_arch(b""), None);
    }
}
